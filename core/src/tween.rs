//! Frame-driven value tweening with easing curves.
//!
//! A [`Tween`] owns its start/end values and elapsed time; callers advance it once per frame
//! with that frame's delta and apply the returned value. Nothing is captured or scheduled.

use std::f32::consts::PI;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Linear interpolation between two values of the same type.
pub trait Lerp: Clone {
    fn lerp(&self, to: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vector3<f32> {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Vector3::lerp(self, to, t)
    }
}

impl Lerp for Point3<f32> {
    fn lerp(&self, to: &Self, t: f32) -> Self {
        Point3::from(self.coords.lerp(&to.coords, t))
    }
}

/// Easing curves mapping normalized time `[0, 1]` onto progress `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    #[default]
    CubicInOut,
    SineInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::QuadOut => t * (2.0 - t),
            Self::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = 2.0 * t - 2.0;
                    0.5 * f * f * f + 1.0
                }
            }
            Self::SineInOut => 0.5 * (1.0 - (PI * t).cos()),
        }
    }
}

/// Interpolates from `start` to `end` over `duration` seconds.
#[derive(Clone, Debug)]
pub struct Tween<T: Lerp> {
    start: T,
    end: T,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl<T: Lerp> Tween<T> {
    /// A zero or negative duration finishes on the first [`Tween::advance`].
    pub fn new(start: T, end: T, duration: f32, easing: Easing) -> Self {
        Self {
            start,
            end,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    /// Step by `dt` seconds and return the value for the new time.
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> T {
        if self.duration <= 0.0 {
            return self.end.clone();
        }
        let progress = self.easing.apply(self.elapsed / self.duration);
        self.start.lerp(&self.end, progress)
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
