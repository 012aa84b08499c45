//! Orbit camera rig: a target point plus a spherical offset, with damped rotate/pan/zoom.
//!
//! Angles follow the usual y-up convention: `polar` is measured from +Y, `azimuth` around +Y
//! starting at +Z and turning toward +X.

use std::f32::consts::{FRAC_PI_2, PI};

use nalgebra::{Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::tween::{Easing, Lerp, Tween};

/// Keeps the polar angle off the poles so `look_at` always has a usable up vector.
const POLE_EPS: f32 = 1.0e-6;

/// Per-scroll-step dolly factor.
const ZOOM_STEP_SCALE: f32 = 0.95;

/// Where the camera is and what it looks at.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
}

impl Lerp for CameraPose {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Self {
            eye: self.eye.lerp(&to.eye, t),
            target: self.target.lerp(&to.target, t),
        }
    }
}

/// Orbit constraints and feel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians from +Y.
    pub min_polar: f32,
    /// Radians from +Y; `PI / 2` keeps the camera above the ground plane.
    pub max_polar: f32,
    /// Fraction of the pending motion applied per update; `0` disables damping.
    pub damping: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_distance: 200.0,
            max_distance: 3000.0,
            min_polar: 0.0,
            max_polar: FRAC_PI_2,
            damping: 0.05,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrbitRig {
    target: Point3<f32>,
    radius: f32,
    azimuth: f32,
    polar: f32,
    pending_rotation: Vector2<f32>,
    pending_pan: Vector3<f32>,
    pending_zoom: f32,
    limits: OrbitLimits,
}

impl OrbitRig {
    pub fn new(pose: CameraPose, limits: OrbitLimits) -> Self {
        let mut rig = Self {
            target: pose.target,
            radius: 0.0,
            azimuth: 0.0,
            polar: 0.0,
            pending_rotation: Vector2::zeros(),
            pending_pan: Vector3::zeros(),
            pending_zoom: 1.0,
            limits,
        };
        rig.set_pose(pose);
        rig
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn eye(&self) -> Point3<f32> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        self.target
            + Vector3::new(
                self.radius * sin_polar * sin_azimuth,
                self.radius * cos_polar,
                self.radius * sin_polar * cos_azimuth,
            )
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye(),
            target: self.target,
        }
    }

    /// Jump to `pose`, dropping any pending damped motion.
    pub fn set_pose(&mut self, pose: CameraPose) {
        let offset = pose.eye - pose.target;
        self.target = pose.target;
        self.radius = offset.norm();
        if self.radius > 0.0 {
            self.polar = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
            self.azimuth = offset.x.atan2(offset.z);
        }
        self.pending_rotation = Vector2::zeros();
        self.pending_pan = Vector3::zeros();
        self.pending_zoom = 1.0;
        self.clamp();
    }

    /// Queue an orbit from a pointer drag in pixels.
    ///
    /// A drag across the full viewport height turns the camera one full revolution.
    pub fn rotate_pixels(&mut self, delta: Vector2<f32>, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = 2.0 * PI * self.limits.rotate_speed / viewport_height;
        self.pending_rotation -= delta * scale;
    }

    /// Queue a pan from a pointer drag in pixels; the point under the cursor stays put.
    pub fn pan_pixels(&mut self, delta: Vector2<f32>, viewport_height: f32, fov_y: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let world_per_pixel =
            2.0 * self.radius * (fov_y * 0.5).tan() / viewport_height * self.limits.pan_speed;

        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(&Vector3::y()).try_normalize(1.0e-6);
        let Some(right) = right else {
            return;
        };
        let up = right.cross(&forward);

        self.pending_pan += -right * (delta.x * world_per_pixel) + up * (delta.y * world_per_pixel);
    }

    /// Queue a dolly; positive steps move toward the target.
    pub fn zoom_steps(&mut self, steps: f32) {
        self.pending_zoom *= ZOOM_STEP_SCALE.powf(steps * self.limits.zoom_speed);
    }

    /// Apply pending motion for one frame.
    pub fn update(&mut self) {
        let damping = self.limits.damping;
        let (applied, keep) = if damping > 0.0 {
            (damping.min(1.0), 1.0 - damping.min(1.0))
        } else {
            (1.0, 0.0)
        };

        self.azimuth += self.pending_rotation.x * applied;
        self.polar += self.pending_rotation.y * applied;
        self.target += self.pending_pan * applied;
        self.radius *= self.pending_zoom;

        self.pending_rotation *= keep;
        self.pending_pan *= keep;
        self.pending_zoom = 1.0;
        self.clamp();
    }

    /// Tween from the current pose to `to`.
    pub fn tween_to(&self, to: CameraPose, duration: f32, easing: Easing) -> Tween<CameraPose> {
        Tween::new(self.pose(), to, duration, easing)
    }

    fn clamp(&mut self) {
        let min_polar = self.limits.min_polar.max(POLE_EPS);
        let max_polar = self.limits.max_polar.min(PI - POLE_EPS).max(min_polar);
        self.polar = self.polar.clamp(min_polar, max_polar);

        let max_distance = self.limits.max_distance.max(self.limits.min_distance);
        self.radius = self.radius.clamp(self.limits.min_distance, max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{point, vector};

    fn museum_pose() -> CameraPose {
        CameraPose {
            eye: point![0.0, 1000.0, 300.0],
            target: point![0.0, 0.0, 0.0],
        }
    }

    fn undamped() -> OrbitLimits {
        OrbitLimits {
            damping: 0.0,
            ..OrbitLimits::default()
        }
    }

    #[test]
    fn pose_round_trips_through_spherical_form() {
        let rig = OrbitRig::new(museum_pose(), OrbitLimits::default());
        assert_relative_eq!(rig.eye(), museum_pose().eye, epsilon = 1.0e-2);
        assert_relative_eq!(rig.target(), museum_pose().target);
    }

    #[test]
    fn polar_is_clamped_above_horizon() {
        let mut rig = OrbitRig::new(museum_pose(), undamped());
        // Drag hard upward: polar would pass PI / 2.
        rig.rotate_pixels(vector![0.0, -5000.0], 600.0);
        rig.update();
        assert_relative_eq!(rig.polar(), FRAC_PI_2, epsilon = 1.0e-5);
        assert!(rig.eye().y >= -1.0e-2);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut rig = OrbitRig::new(museum_pose(), undamped());
        rig.zoom_steps(500.0);
        rig.update();
        assert_relative_eq!(rig.distance(), 200.0);

        rig.zoom_steps(-500.0);
        rig.update();
        assert_relative_eq!(rig.distance(), 3000.0);
    }

    #[test]
    fn damped_rotation_converges_to_requested_angle() {
        let mut damped = OrbitRig::new(museum_pose(), OrbitLimits::default());
        let mut instant = OrbitRig::new(museum_pose(), undamped());
        damped.rotate_pixels(vector![120.0, 0.0], 600.0);
        instant.rotate_pixels(vector![120.0, 0.0], 600.0);

        instant.update();
        for _ in 0..600 {
            damped.update();
        }
        assert_relative_eq!(damped.eye(), instant.eye(), epsilon = 0.5);
    }

    #[test]
    fn pan_moves_eye_and_target_together() {
        let mut rig = OrbitRig::new(museum_pose(), undamped());
        let before = rig.pose();
        rig.pan_pixels(vector![100.0, 0.0], 600.0, 45f32.to_radians());
        rig.update();
        let after = rig.pose();

        let target_shift = after.target - before.target;
        assert!(target_shift.norm() > 1.0);
        assert_relative_eq!(after.eye - before.eye, target_shift, epsilon = 1.0e-2);
        assert_relative_eq!(rig.distance(), (before.eye - before.target).norm(), epsilon = 1.0e-2);
    }

    #[test]
    fn reset_tween_ends_on_initial_pose() {
        let mut rig = OrbitRig::new(museum_pose(), undamped());
        rig.rotate_pixels(vector![300.0, 50.0], 600.0);
        rig.update();

        let mut tween = rig.tween_to(museum_pose(), 1.0, Easing::CubicInOut);
        rig.set_pose(tween.advance(2.0));
        assert!(tween.is_finished());
        assert_relative_eq!(rig.eye(), museum_pose().eye, epsilon = 1.0e-2);
    }
}
