use bevy::{prelude::*, scene::SceneInstanceReady};
use museum_core::ExhibitGallery;

use crate::{
    camera::ResetCamera,
    config::Config,
    world::{Tint, apply_tint, tint_material},
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (spawn_exhibits, spawn_buttons));
    app.add_systems(
        Update,
        (
            handle_buttons,
            sync_visibility.run_if(resource_changed::<Gallery>),
        )
            .chain(),
    );
}

#[derive(Resource, Deref, DerefMut)]
pub struct Gallery(pub ExhibitGallery);

/// Index of the exhibit a scene root belongs to.
#[derive(Component, Clone, Copy)]
pub struct Exhibit(pub usize);

#[derive(Component, Clone, Copy)]
enum GalleryButton {
    Show(usize),
    Reset,
}

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.15, 0.15);
const BUTTON_HOVERED: Color = Color::srgb(0.25, 0.25, 0.25);
const BUTTON_PRESSED: Color = Color::srgb(0.35, 0.55, 0.35);

fn spawn_exhibits(
    mut commands: Commands,
    config: Res<Config>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(Gallery(ExhibitGallery::new(
        config.exhibits.iter().map(|exhibit| exhibit.name.clone()),
    )));

    for (index, exhibit) in config.exhibits.iter().enumerate() {
        commands
            .spawn((
                Name::new(exhibit.name.clone()),
                Exhibit(index),
                Visibility::Hidden,
                Tint(materials.add(tint_material(exhibit.color))),
                SceneRoot(
                    asset_server.load(GltfAssetLabel::Scene(0).from_asset(exhibit.path.clone())),
                ),
            ))
            .observe(apply_tint)
            .observe(mark_loaded);
    }
}

fn mark_loaded(
    ready: On<SceneInstanceReady>,
    exhibits: Query<&Exhibit>,
    mut gallery: ResMut<Gallery>,
) {
    let Ok(Exhibit(index)) = exhibits.get(ready.entity) else {
        return;
    };
    match gallery.mark_loaded(*index) {
        Ok(()) => debug!("Exhibit {index} loaded"),
        Err(err) => warn!("{err}"),
    }
}

fn spawn_buttons(mut commands: Commands, config: Res<Config>) {
    let labels = config
        .exhibits
        .iter()
        .enumerate()
        .map(|(index, exhibit)| (GalleryButton::Show(index), exhibit.name.clone()))
        .chain(std::iter::once((GalleryButton::Reset, "Reset".to_string())));

    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(12.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            column_gap: Val::Px(8.0),
            ..default()
        })
        .with_children(|bar| {
            for (button, label) in labels {
                bar.spawn((
                    button,
                    Button,
                    Node {
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                        ..default()
                    },
                    BackgroundColor(BUTTON_IDLE),
                    children![(
                        Text::new(label),
                        TextFont::from_font_size(16.0),
                        TextColor(Color::WHITE),
                    )],
                ));
            }
        });
}

fn handle_buttons(
    mut buttons: Query<
        (&Interaction, &GalleryButton, &mut BackgroundColor),
        Changed<Interaction>,
    >,
    mut gallery: ResMut<Gallery>,
    mut resets: MessageWriter<ResetCamera>,
) {
    for (interaction, button, mut background) in &mut buttons {
        *background = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVERED,
            Interaction::None => BUTTON_IDLE,
        }
        .into();

        if *interaction != Interaction::Pressed {
            continue;
        }
        match *button {
            GalleryButton::Show(index) => match gallery.show_only(index) {
                Ok(true) => {}
                Ok(false) => info!("Exhibit {index} is still loading"),
                Err(err) => warn!("{err}"),
            },
            GalleryButton::Reset => {
                resets.write(ResetCamera);
            }
        }
    }
}

fn sync_visibility(gallery: Res<Gallery>, mut exhibits: Query<(&Exhibit, &mut Visibility)>) {
    for (Exhibit(index), mut visibility) in &mut exhibits {
        *visibility = if gallery.is_visible(*index) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
