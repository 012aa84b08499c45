use bevy::prelude::*;
use museum_core::ViewerConfig;

/// Read from the working directory so it can be edited without rebuilding.
const CONFIG_PATH: &str = "assets/museum.json";

#[derive(Resource, Deref)]
pub struct Config(pub ViewerConfig);

pub(super) fn load() -> ViewerConfig {
    ViewerConfig::load_or_default(CONFIG_PATH)
}
