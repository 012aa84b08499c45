use bevy::{
    light::{CascadeShadowConfigBuilder, DirectionalLightShadowMap},
    prelude::*,
    scene::SceneInstanceReady,
};

use crate::{config::Config, convert};

/// Config intensities are 0..1; these map them onto bevy's photometric units.
const AMBIENT_BRIGHTNESS_SCALE: f32 = 800.0;
const DIRECTIONAL_LUX_SCALE: f32 = light_consts::lux::AMBIENT_DAYLIGHT;

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, setup);
}

/// Flat material applied to every mesh of a glTF scene once it has spawned.
#[derive(Component, Clone)]
pub struct Tint(pub Handle<StandardMaterial>);

fn setup(
    mut commands: Commands,
    config: Res<Config>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let lights = &config.lights;
    info!("World setup, loading `{}`", config.museum.path);

    commands.insert_resource(ClearColor(convert::color(config.background)));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: lights.ambient_intensity * AMBIENT_BRIGHTNESS_SCALE,
        ..default()
    });
    commands.insert_resource(DirectionalLightShadowMap {
        size: lights.shadow_map_size,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: lights.directional_intensity * DIRECTIONAL_LUX_SCALE,
            shadows_enabled: true,
            ..default()
        },
        CascadeShadowConfigBuilder {
            num_cascades: 1,
            maximum_distance: lights.shadow_extent * 2.0,
            ..default()
        }
        .build(),
        Transform::from_translation(Vec3::from_array(lights.directional_position))
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands
        .spawn((
            Name::new(config.museum.name.clone()),
            Tint(materials.add(tint_material(config.museum.color))),
            SceneRoot(
                asset_server.load(GltfAssetLabel::Scene(0).from_asset(config.museum.path.clone())),
            ),
        ))
        .observe(apply_tint);
}

pub fn tint_material(hex: u32) -> StandardMaterial {
    StandardMaterial {
        base_color: convert::color(hex),
        perceptual_roughness: 1.0,
        metallic: 0.0,
        ..default()
    }
}

/// Swap the glTF materials of a freshly spawned scene for its [`Tint`].
pub fn apply_tint(
    ready: On<SceneInstanceReady>,
    mut commands: Commands,
    tints: Query<&Tint>,
    children: Query<&Children>,
    meshes: Query<(), With<Mesh3d>>,
) {
    let root = ready.entity;
    let Ok(tint) = tints.get(root) else {
        return;
    };
    for entity in children.iter_descendants(root) {
        if meshes.contains(entity) {
            commands
                .entity(entity)
                .insert(MeshMaterial3d(tint.0.clone()));
        }
    }
}
