//! Pointer-to-target resolution: viewport pixels -> NDC -> world ray -> first scene hit.

use nalgebra::{Isometry3, Perspective3, Point3, Vector2, Vector3};
pub use rapier3d::prelude::Ray;

/// Anything that can intersect a world-space ray with the currently visible geometry.
///
/// Returns the nearest impact point, or `None` when the ray hits nothing.
pub trait RayCaster {
    fn first_hit(&mut self, ray: &Ray) -> Option<Point3<f32>>;
}

/// Convert a cursor position in pixels (origin top-left, y down) into normalized device
/// coordinates (origin at the centre, y up, both axes in [-1, 1]).
///
/// Returns `None` for an empty viewport.
pub fn ndc_from_viewport(cursor: Vector2<f32>, viewport: Vector2<f32>) -> Option<Vector2<f32>> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vector2::new(
        cursor.x / viewport.x * 2.0 - 1.0,
        1.0 - cursor.y / viewport.y * 2.0,
    ))
}

/// Perspective camera as seen by the resolver: a right-handed view plus a projection.
#[derive(Clone, Copy, Debug)]
pub struct CameraProjection {
    view: Isometry3<f32>,
    projection: Perspective3<f32>,
}

impl CameraProjection {
    /// `fov_y` is in radians. Degenerate aspect ratios are clamped to a tiny positive value.
    pub fn new(
        eye: &Point3<f32>,
        target: &Point3<f32>,
        up: &Vector3<f32>,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let near = near.max(1.0e-4);
        let far = far.max(near * 2.0);
        Self {
            view: Isometry3::look_at_rh(eye, target, up),
            projection: Perspective3::new(aspect.max(1.0e-6), fov_y, near, far),
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        self.view.inverse_transform_point(&Point3::origin())
    }

    /// World point -> NDC (z in [-1, 1] between the near and far planes).
    pub fn project(&self, world: &Point3<f32>) -> Point3<f32> {
        self.projection
            .project_point(&self.view.transform_point(world))
    }

    /// World-space ray from the near plane through the far plane at `ndc`.
    pub fn ray_through(&self, ndc: &Vector2<f32>) -> Ray {
        let near = self
            .projection
            .unproject_point(&Point3::new(ndc.x, ndc.y, -1.0));
        let far = self
            .projection
            .unproject_point(&Point3::new(ndc.x, ndc.y, 1.0));
        let origin = self.view.inverse_transform_point(&near);
        let end = self.view.inverse_transform_point(&far);
        Ray::new(origin, (end - origin).normalize())
    }
}

/// Resolve a click at `ndc` to the nearest visible impact point.
///
/// Clicks outside the viewport (any axis outside [-1, 1] or non-finite) resolve to nothing.
pub fn resolve_target<S>(
    scene: &mut S,
    camera: &CameraProjection,
    ndc: &Vector2<f32>,
) -> Option<Point3<f32>>
where
    S: RayCaster + ?Sized,
{
    let inside = ndc
        .iter()
        .all(|c| c.is_finite() && (-1.0..=1.0).contains(c));
    if !inside {
        return None;
    }
    scene.first_hit(&camera.ray_through(ndc))
}
