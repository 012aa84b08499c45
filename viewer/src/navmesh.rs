//! Builds the walkable zone and hands it to the navigation controller.

use bevy::{
    asset::LoadState,
    mesh::{Indices, VertexAttributeValues},
    prelude::*,
};
use museum_core::{
    CoreError, NavMeshGeometry, Zone,
    config::NavmeshSource,
};
use nalgebra::Point3;

use crate::{agent::Navigation, config::Config};

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, request_navmesh);
    app.add_systems(
        Update,
        register_navmesh.run_if(resource_exists::<PendingNavmesh>),
    );
}

#[derive(Resource)]
enum PendingNavmesh {
    Geometry(NavMeshGeometry),
    Asset(Handle<Mesh>),
}

fn request_navmesh(mut commands: Commands, config: Res<Config>, asset_server: Res<AssetServer>) {
    let pending = match &config.navmesh.source {
        NavmeshSource::Floor {
            center,
            half_extent,
        } => PendingNavmesh::Geometry(NavMeshGeometry::floor(
            Point3::from(*center),
            *half_extent,
        )),
        NavmeshSource::Asset { path } => PendingNavmesh::Asset(asset_server.load(
            GltfAssetLabel::Primitive {
                mesh: 0,
                primitive: 0,
            }
            .from_asset(path.clone()),
        )),
    };
    commands.insert_resource(pending);
}

fn register_navmesh(
    mut commands: Commands,
    pending: Res<PendingNavmesh>,
    meshes: Res<Assets<Mesh>>,
    asset_server: Res<AssetServer>,
    mut navigation: ResMut<Navigation>,
    config: Res<Config>,
) {
    let geometry = match &*pending {
        PendingNavmesh::Geometry(geometry) => Ok(geometry.clone()),
        PendingNavmesh::Asset(handle) => match meshes.get(handle) {
            Some(mesh) => geometry_from_mesh(mesh),
            None => {
                if let LoadState::Failed(err) = asset_server.load_state(handle.id()) {
                    warn!("Navmesh asset failed to load: {err}");
                    commands.remove_resource::<PendingNavmesh>();
                }
                return;
            }
        },
    };
    commands.remove_resource::<PendingNavmesh>();

    match geometry.and_then(|geometry| Zone::build(&geometry)) {
        Ok(zone) => {
            let zone_name = config.navmesh.zone.clone();
            navigation.pathfinder_mut().set_zone_data(zone_name, zone);
        }
        Err(err) => warn!("Navmesh rejected: {err}"),
    }
}

/// Positions and triangle list of a mesh; unindexed meshes are read as consecutive triples.
fn geometry_from_mesh(mesh: &Mesh) -> Result<NavMeshGeometry, CoreError> {
    let Some(VertexAttributeValues::Float32x3(positions)) =
        mesh.attribute(Mesh::ATTRIBUTE_POSITION)
    else {
        return Err(CoreError::InvalidGeometry(
            "navmesh has no float3 positions".to_string(),
        ));
    };

    let indices = match mesh.indices() {
        Some(Indices::U16(indices)) => indices.iter().map(|&i| u32::from(i)).collect(),
        Some(Indices::U32(indices)) => indices.clone(),
        None => (0..positions.len() as u32).collect(),
    };

    Ok(NavMeshGeometry::new(positions.clone(), indices))
}
