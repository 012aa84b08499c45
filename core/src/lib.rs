//! Engine-agnostic logic for the museum viewer.
//!
//! Everything here is plain data plus `nalgebra`/`rapier3d` math so it can be driven by the
//! bevy viewer and exercised headless in tests.

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod exhibits;
pub mod follower;
pub mod navmesh;
pub mod orbit;
pub mod pointer;
pub mod scene;
pub mod tween;

pub use config::ViewerConfig;
pub use constants::{
    DEFAULT_AGENT_SPEED, DEFAULT_ZONE, VERTEX_MERGE_EPSILON, WAYPOINT_REACHED_DISTANCE_SQ,
};
pub use controller::{ClickOutcome, NavigationController};
pub use error::{CoreError, Result};
pub use exhibits::ExhibitGallery;
pub use follower::{Agent, FollowerState, Path, TickOutcome, WaypointFollower};
pub use navmesh::{GroupId, NavMeshGeometry, NavNode, PathQuery, Pathfinding, Zone};
pub use orbit::{CameraPose, OrbitLimits, OrbitRig};
pub use pointer::{CameraProjection, RayCaster, ndc_from_viewport, resolve_target};
pub use scene::{SceneObjectDef, SceneObjectId, SceneShapeDef, StaticScene};
pub use tween::{Easing, Lerp, Tween};
