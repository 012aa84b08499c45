/// Squared distance (world units²) under which a waypoint counts as reached.
///
/// Compared against the squared length of `waypoint - position` so no square root is needed.
pub const WAYPOINT_REACHED_DISTANCE_SQ: f32 = 0.0025;

/// Default agent speed in world units per second.
///
/// The museum scene is authored in centimetre-ish units (the camera orbits at 200..3000),
/// so this is a brisk walk.
pub const DEFAULT_AGENT_SPEED: f32 = 200.0;

/// Name the viewer registers its navigation mesh under.
pub const DEFAULT_ZONE: &str = "museum";

/// Vertices closer than this (per axis) are merged when building a zone.
pub const VERTEX_MERGE_EPSILON: f32 = 1.0e-4;

/// Triangles whose doubled XZ/3D area falls below this are dropped as degenerate.
pub const DEGENERATE_AREA_EPS: f32 = 1.0e-8;

/// Largest vertical gap between a path target and the walkable triangle under it.
///
/// Clicks on walls or exhibits sit well above the floor and are treated as unreachable.
pub const NAVMESH_HEIGHT_TOLERANCE: f32 = 5.0;

/// Upper bound for ray casts when the caller has no better limit (matches the camera far plane).
pub const DEFAULT_RAY_MAX_DISTANCE: f32 = 20_000.0;

/// Largest frame delta (seconds) fed into the follower.
///
/// Keeps a stalled frame (window drag, tab switch) from teleporting the agent across the room.
pub const MAX_FRAME_DT_S: f32 = 0.10;
