//! Viewer configuration.
//!
//! Every field has a default matching the stock museum scene, so a config file only needs the
//! values it changes. Colours are `0xRRGGBB` sRGB integers.

use std::{io::ErrorKind, path::Path};

use nalgebra::{Point3, point};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_AGENT_SPEED, DEFAULT_ZONE},
    error::{CoreError, Result},
    orbit::{CameraPose, OrbitLimits},
    tween::Easing,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_title: String,
    pub background: u32,
    pub camera: CameraConfig,
    pub lights: LightConfig,
    pub museum: ModelConfig,
    pub exhibits: Vec<ModelConfig>,
    pub agent: AgentConfig,
    pub navmesh: NavmeshConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Museum".to_string(),
            background: 0xa8def0,
            camera: CameraConfig::default(),
            lights: LightConfig::default(),
            museum: ModelConfig {
                name: "Museum".to_string(),
                path: "models/museum.glb".to_string(),
                color: 0xfbc9c7,
            },
            exhibits: (1..=5)
                .map(|n| ModelConfig {
                    name: format!("Exhibit {n}"),
                    path: format!("models/{n}.glb"),
                    color: 0xffff00,
                })
                .collect(),
            agent: AgentConfig::default(),
            navmesh: NavmeshConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Pose on startup and after a reset.
    pub initial: CameraPose,
    pub orbit: OrbitLimits,
    /// Seconds the reset animation takes.
    pub reset_duration: f32,
    pub reset_easing: Easing,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 20_000.0,
            initial: CameraPose {
                eye: point![0.0, 1000.0, 300.0],
                target: point![0.0, 0.0, 0.0],
            },
            orbit: OrbitLimits::default(),
            reset_duration: 1.0,
            reset_easing: Easing::CubicInOut,
        }
    }
}

/// Light intensities use a 0..1 scale; the viewer maps them onto its own units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub shadow_map_size: usize,
    /// Half-size of the area the directional shadow covers.
    pub shadow_extent: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.6,
            directional_intensity: 0.5,
            directional_position: [500.0, 800.0, 500.0],
            shadow_map_size: 4096,
            shadow_extent: 1000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    /// Asset path of a glTF file, relative to the asset root.
    pub path: String,
    /// Flat tint applied to every mesh of the model.
    pub color: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub height: f32,
    pub radius: f32,
    pub start: [f32; 3],
    /// World units per second.
    pub speed: f32,
    pub color: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            height: 15.0,
            radius: 5.0,
            start: [0.0, 0.0, 260.0],
            speed: DEFAULT_AGENT_SPEED,
            color: 0x008000,
        }
    }
}

impl AgentConfig {
    pub fn start_position(&self) -> Point3<f32> {
        Point3::from(self.start)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavmeshConfig {
    pub zone: String,
    pub source: NavmeshSource,
}

impl Default for NavmeshConfig {
    fn default() -> Self {
        Self {
            zone: DEFAULT_ZONE.to_string(),
            source: NavmeshSource::Floor {
                center: [0.0, 0.0, 0.0],
                half_extent: 1000.0,
            },
        }
    }
}

/// Where the walkable surface comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavmeshSource {
    /// First mesh primitive of a glTF asset.
    Asset { path: String },
    /// Flat square floor.
    Floor { center: [f32; 3], half_extent: f32 },
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load `path`, falling back to defaults when it is missing or broken.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(CoreError::ConfigIo { path, source }) if source.kind() == ErrorKind::NotFound => {
                log::info!("No config at `{path}`, using defaults");
                Self::default()
            }
            Err(err) => {
                log::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }
}

/// Split `0xRRGGBB` into sRGB components in `[0, 1]`.
pub fn srgb_components(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0)]
}
