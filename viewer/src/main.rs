// Support configuring Bevy lints within code.
#![cfg_attr(bevy_lint, feature(register_tool), register_tool(bevy))]
// Disable console on Windows for non-dev builds.
#![cfg_attr(not(feature = "dev"), windows_subsystem = "windows")]

#[cfg(feature = "dev_native")]
mod debug_tools;

mod agent;
mod camera;
mod config;
mod convert;
mod exhibits;
mod input;
mod navmesh;
mod world;

use bevy::prelude::*;

fn main() -> AppExit {
    App::new().add_plugins(AppPlugin).run()
}

pub struct AppPlugin;
impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        let config = config::load();

        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Window {
                title: config.window_title.clone(),
                fit_canvas_to_parent: true,
                ..default()
            }
            .into(),
            ..default()
        }));

        app.insert_resource(config::Config(config));

        app.add_plugins((
            input::plugin,
            world::plugin,
            exhibits::plugin,
            camera::plugin,
            navmesh::plugin,
            agent::plugin,
        ));

        #[cfg(feature = "dev_native")]
        app.add_plugins(debug_tools::plugin);
    }
}
