use bevy::{
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    prelude::*,
    window::PrimaryWindow,
};
use leafwing_input_manager::prelude::ActionState;
use museum_core::{
    Agent, ClickOutcome, NavigationController, Pathfinding, RayCaster, constants::MAX_FRAME_DT_S,
    ndc_from_viewport, pointer::Ray,
};
use nalgebra::{Point3, vector};

use crate::{
    camera::{self, MainCamera},
    config::Config,
    convert,
    input::InputAction,
};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_agent);
    app.add_systems(Update, (handle_click, walk).chain());
}

#[derive(Resource, Deref, DerefMut)]
pub struct Navigation(pub NavigationController<Pathfinding>);

/// Root of the avatar; its translation is the agent's feet.
#[derive(Component)]
pub struct AgentAvatar;

/// The avatar's visible body, excluded from click ray casts.
#[derive(Component)]
struct AvatarBody;

fn spawn_agent(
    mut commands: Commands,
    config: Res<Config>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let agent = &config.agent;
    let start = agent.start_position();

    commands.insert_resource(Navigation(NavigationController::new(
        Pathfinding::new(),
        config.navmesh.zone.clone(),
        Agent::new(start, agent.speed),
    )));

    commands.spawn((
        Name::new("Agent"),
        AgentAvatar,
        Transform::from_translation(convert::from_point(&start)),
        Visibility::default(),
        children![(
            AvatarBody,
            Mesh3d(meshes.add(Cylinder::new(agent.radius, agent.height))),
            MeshMaterial3d(materials.add(convert::color(agent.color))),
            // Cylinder meshes are centred; lift it so the base sits on the agent position.
            Transform::from_xyz(0.0, agent.height * 0.5, 0.0),
        )],
    ));
}

/// Visible scene meshes as seen by the click resolver.
struct VisibleMeshes<'a, 'w, 's> {
    ray_cast: &'a mut MeshRayCast<'w, 's>,
    avatar: Option<Entity>,
}

impl RayCaster for VisibleMeshes<'_, '_, '_> {
    fn first_hit(&mut self, ray: &Ray) -> Option<Point3<f32>> {
        let ray = convert::from_ray(ray)?;
        let avatar = self.avatar;
        let filter = |entity: Entity| Some(entity) != avatar;
        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Visible)
            .with_filter(&filter);

        self.ray_cast
            .cast_ray(ray, &settings)
            .first()
            .map(|(_, hit)| convert::to_point(hit.point))
    }
}

fn handle_click(
    actions: Res<ActionState<InputAction>>,
    buttons: Query<&Interaction, With<Button>>,
    window: Single<&Window, With<PrimaryWindow>>,
    avatar: Query<Entity, With<AvatarBody>>,
    mut ray_cast: MeshRayCast,
    mut navigation: ResMut<Navigation>,
    camera_transform: Single<&GlobalTransform, With<MainCamera>>,
    config: Res<Config>,
) {
    if !actions.just_pressed(&InputAction::LeftClick) {
        return;
    }
    // Clicks on the button bar belong to the UI.
    if buttons.iter().any(|interaction| *interaction != Interaction::None) {
        return;
    }
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Some(ndc) = ndc_from_viewport(
        convert::to_vector2(cursor),
        vector![window.width(), window.height()],
    ) else {
        return;
    };

    let projection = camera::projection(*camera_transform, &config, window.width(), window.height());
    let mut scene = VisibleMeshes {
        ray_cast: &mut ray_cast,
        avatar: avatar.iter().next(),
    };

    match navigation.handle_click(&mut scene, &projection, &ndc) {
        ClickOutcome::Following { target, waypoints } => {
            debug!("Walking to {target:?} via {waypoints} waypoints");
        }
        ClickOutcome::NoTarget => debug!("Click hit nothing"),
        // Already logged by the controller.
        ClickOutcome::Unreachable { .. } | ClickOutcome::QueryFailed { .. } => {}
    }
}

fn walk(
    time: Res<Time>,
    mut navigation: ResMut<Navigation>,
    mut avatar: Single<&mut Transform, With<AgentAvatar>>,
) {
    navigation.tick(time.delta_secs().min(MAX_FRAME_DT_S));
    avatar.translation = convert::from_point(&navigation.agent().position);
}
