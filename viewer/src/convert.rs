//! glam <-> nalgebra conversions between bevy and `museum_core`.

use bevy::prelude::*;
use museum_core::config::srgb_components;
use nalgebra as na;

pub fn to_point(v: Vec3) -> na::Point3<f32> {
    na::Point3::new(v.x, v.y, v.z)
}

pub fn to_vector2(v: Vec2) -> na::Vector2<f32> {
    na::Vector2::new(v.x, v.y)
}

pub fn from_point(p: &na::Point3<f32>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

pub fn from_ray(ray: &museum_core::pointer::Ray) -> Option<Ray3d> {
    let direction = Dir3::new(Vec3::new(ray.dir.x, ray.dir.y, ray.dir.z)).ok()?;
    Some(Ray3d::new(from_point(&ray.origin), direction))
}

pub fn color(hex: u32) -> Color {
    let [r, g, b] = srgb_components(hex);
    Color::srgb(r, g, b)
}
