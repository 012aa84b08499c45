//! Rapier-backed raycast world for the static museum scene.
//!
//! Builds an in-memory Rapier query world from [`SceneObjectDef`]s and answers pointer rays
//! against it. Objects can be hidden at runtime; hidden objects are skipped by ray casts the
//! same way a renderer skips invisible meshes.
//!
//! Design goals
//! - Deterministic: inputs are sorted by `id` before insertion.
//! - Query-only: static geometry, no dynamics. Bodies never move after construction.

use std::collections::HashMap;

use nalgebra::{Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::{
    constants::DEFAULT_RAY_MAX_DISTANCE,
    error::{CoreError, Result},
    navmesh::NavMeshGeometry,
    pointer::RayCaster,
};

/// Stable identifier of a scene object, also stored in each collider's `user_data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneObjectId(pub u32);

/// Definition of one static scene object.
///
/// Conventions
/// - Rotation is a unit quaternion.
/// - For planes the normal is `rotation * +Y` and the plane passes through
///   `translation + normal * offset_along_normal`.
#[derive(Clone, Debug)]
pub struct SceneObjectDef {
    pub id: SceneObjectId,
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub shape: SceneShapeDef,
    pub visible: bool,
}

impl SceneObjectDef {
    pub fn new(id: u32, translation: Vector3<f32>, shape: SceneShapeDef) -> Self {
        Self {
            id: SceneObjectId(id),
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
            visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Supported collider shapes for pick geometry.
#[derive(Clone, Debug)]
pub enum SceneShapeDef {
    /// Infinite plane (half-space).
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vector3<f32> },

    /// Y-aligned cylinder.
    CylinderY { radius: f32, half_height: f32 },

    /// Arbitrary triangle mesh, in the object's local frame.
    TriMesh(NavMeshGeometry),
}

/// In-memory Rapier structures needed for ray queries against the static scene.
pub struct StaticScene {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    visibility: HashMap<SceneObjectId, bool>,
    max_distance: f32,
}

impl StaticScene {
    /// Build a query world from static object definitions.
    pub fn build(mut defs: Vec<SceneObjectDef>) -> Result<Self> {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut visibility = HashMap::with_capacity(defs.len());

        for def in &defs {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());

            let collider = collider_from_def(def)?;
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
            visibility.insert(def.id, def.visible);
        }

        // Collision-detection only (no dynamics): updates the broad-phase BVH so queries run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::debug!("Built static scene with {} objects", defs.len());

        Ok(Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            visibility,
            max_distance: DEFAULT_RAY_MAX_DISTANCE,
        })
    }

    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance.max(0.0);
        self
    }

    /// Show or hide an object. Returns `false` if the id is unknown.
    pub fn set_visible(&mut self, id: SceneObjectId, visible: bool) -> bool {
        match self.visibility.get_mut(&id) {
            Some(flag) => {
                *flag = visible;
                true
            }
            None => false,
        }
    }

    pub fn is_visible(&self, id: SceneObjectId) -> Option<bool> {
        self.visibility.get(&id).copied()
    }

    fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

impl RayCaster for StaticScene {
    fn first_hit(&mut self, ray: &Ray) -> Option<Point3<f32>> {
        let visibility = &self.visibility;
        let visible = |_handle: ColliderHandle, collider: &Collider| {
            let id = SceneObjectId(collider.user_data as u32);
            visibility.get(&id).copied().unwrap_or(false)
        };

        let pipeline = self.query_pipeline(QueryFilter::default().predicate(&visible));
        pipeline
            .cast_ray(ray, self.max_distance, true)
            .map(|(_handle, toi)| ray.point_at(toi))
    }
}

/// Build a Rapier collider from a `SceneObjectDef`.
///
/// The pose lives on the parent rigid-body, so the collider has an identity local transform.
fn collider_from_def(def: &SceneObjectDef) -> Result<Collider> {
    let builder = match &def.shape {
        SceneShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body already carries the pose, so the half-space is expressed in the
            // body frame: +Y normal, shifted along it by the offset.
            ColliderBuilder::halfspace(Vector::y_axis())
                .translation(Vector::y() * *offset_along_normal)
        }

        SceneShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        SceneShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),

        SceneShapeDef::TriMesh(geometry) => {
            if geometry.indices.len() % 3 != 0 {
                return Err(CoreError::InvalidGeometry(format!(
                    "scene object {} has a partial triangle",
                    def.id.0
                )));
            }
            let vertices = geometry
                .positions
                .iter()
                .map(|&[x, y, z]| Point::new(x, y, z))
                .collect();
            let indices = geometry
                .indices
                .chunks_exact(3)
                .map(|face| [face[0], face[1], face[2]])
                .collect();
            ColliderBuilder::trimesh(vertices, indices).map_err(|err| {
                CoreError::InvalidGeometry(format!("scene object {}: {err:?}", def.id.0))
            })?
        }
    };

    Ok(builder.user_data(u128::from(def.id.0)).build())
}
