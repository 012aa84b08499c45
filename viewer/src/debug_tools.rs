//! Debug/performance tooling for native dev builds.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use iyes_perf_ui::prelude::*;

use crate::{agent::Navigation, convert};

/// Lifts the path line off the floor so it is not z-fighting with it.
const PATH_LIFT: f32 = 1.0;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, draw_path.run_if(resource_exists::<Navigation>));
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_path(navigation: Res<Navigation>, mut gizmos: Gizmos) {
    let Some(path) = navigation.path() else {
        return;
    };
    let lift = Vec3::Y * PATH_LIFT;
    let points = std::iter::once(&navigation.agent().position)
        .chain(path.waypoints())
        .map(|point| convert::from_point(point) + lift);

    gizmos.linestrip(points, Color::srgb(1.0, 0.3, 0.2));
    for waypoint in path.waypoints() {
        gizmos.sphere(convert::from_point(waypoint) + lift, 2.0, Color::WHITE);
    }
}
