//! Zone construction from raw triangle geometry.

use std::collections::{BTreeMap, HashMap, VecDeque};

use nalgebra::{Point3, point};

use super::{NavNode, Zone};
use crate::{
    constants::{DEGENERATE_AREA_EPS, VERTEX_MERGE_EPSILON},
    error::{CoreError, Result},
};

/// Walkable-surface triangles as they come out of a mesh asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavMeshGeometry {
    pub positions: Vec<[f32; 3]>,
    /// Triangle list; three indices per face.
    pub indices: Vec<u32>,
}

impl NavMeshGeometry {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Flat square floor centred on `center`, two triangles.
    pub fn floor(center: Point3<f32>, half_extent: f32) -> Self {
        let h = half_extent.abs();
        let Point3 { coords, .. } = center;
        Self::new(
            vec![
                [coords.x - h, coords.y, coords.z - h],
                [coords.x + h, coords.y, coords.z - h],
                [coords.x + h, coords.y, coords.z + h],
                [coords.x - h, coords.y, coords.z + h],
            ],
            vec![0, 2, 1, 0, 3, 2],
        )
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Zone {
    /// Build a zone: merge vertices, link triangles sharing an edge and split them into
    /// connected groups.
    pub fn build(geometry: &NavMeshGeometry) -> Result<Self> {
        if geometry.indices.len() % 3 != 0 {
            return Err(CoreError::InvalidGeometry(format!(
                "index count {} is not a multiple of three",
                geometry.indices.len()
            )));
        }
        if let Some(bad) = geometry
            .indices
            .iter()
            .find(|&&i| i as usize >= geometry.positions.len())
        {
            return Err(CoreError::InvalidGeometry(format!(
                "index {bad} out of range for {} vertices",
                geometry.positions.len()
            )));
        }

        let (vertices, remap) = merge_vertices(&geometry.positions);

        let triangles: Vec<[usize; 3]> = geometry
            .indices
            .chunks_exact(3)
            .map(|face| {
                [
                    remap[face[0] as usize],
                    remap[face[1] as usize],
                    remap[face[2] as usize],
                ]
            })
            .filter(|&tri| !is_degenerate(&vertices, tri))
            .collect();

        if triangles.is_empty() {
            return Err(CoreError::InvalidGeometry(
                "navigation mesh has no usable triangles".into(),
            ));
        }

        let dropped = geometry.triangle_count() - triangles.len();
        if dropped > 0 {
            log::debug!("Dropped {dropped} degenerate navmesh triangles");
        }

        let adjacency = link_triangles(&triangles);
        let groups = split_groups(&adjacency);

        // triangle index -> (group, id within group)
        let mut local = vec![(0usize, 0usize); triangles.len()];
        for (group, members) in groups.iter().enumerate() {
            for (id, &tri) in members.iter().enumerate() {
                local[tri] = (group, id);
            }
        }

        let groups = groups
            .iter()
            .map(|members| {
                members
                    .iter()
                    .map(|&tri| {
                        let vertex_ids = triangles[tri];
                        let [a, b, c] = vertex_ids.map(|v| vertices[v].coords);
                        let (neighbours, portals) = adjacency[tri]
                            .iter()
                            .map(|&(other, edge)| (local[other].1, edge))
                            .unzip();
                        NavNode {
                            id: local[tri].1,
                            vertex_ids,
                            centroid: Point3::from((a + b + c) / 3.0),
                            neighbours,
                            portals,
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Self { vertices, groups })
    }
}

/// Weld vertices that round to the same `VERTEX_MERGE_EPSILON` grid cell.
fn merge_vertices(positions: &[[f32; 3]]) -> (Vec<Point3<f32>>, Vec<usize>) {
    let inv = 1.0 / VERTEX_MERGE_EPSILON;
    let mut welded: HashMap<(i64, i64, i64), usize> = HashMap::with_capacity(positions.len());
    let mut vertices = Vec::with_capacity(positions.len());
    let mut remap = Vec::with_capacity(positions.len());

    for &[x, y, z] in positions {
        let key = (
            (x * inv).round() as i64,
            (y * inv).round() as i64,
            (z * inv).round() as i64,
        );
        let index = *welded.entry(key).or_insert_with(|| {
            vertices.push(point![x, y, z]);
            vertices.len() - 1
        });
        remap.push(index);
    }

    (vertices, remap)
}

fn is_degenerate(vertices: &[Point3<f32>], [a, b, c]: [usize; 3]) -> bool {
    if a == b || b == c || a == c {
        return true;
    }
    let ab = vertices[b] - vertices[a];
    let ac = vertices[c] - vertices[a];
    ab.cross(&ac).norm() <= DEGENERATE_AREA_EPS
}

/// For each triangle, the triangles sharing an edge with it plus that edge.
///
/// Edges are keyed in a `BTreeMap` so neighbour order is deterministic.
fn link_triangles(triangles: &[[usize; 3]]) -> Vec<Vec<(usize, [usize; 2])>> {
    let mut edges: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (tri, &[a, b, c]) in triangles.iter().enumerate() {
        for (p, q) in [(a, b), (b, c), (c, a)] {
            edges.entry((p.min(q), p.max(q))).or_default().push(tri);
        }
    }

    let mut adjacency = vec![Vec::new(); triangles.len()];
    for ((p, q), sharing) in edges {
        for (i, &first) in sharing.iter().enumerate() {
            for &second in &sharing[i + 1..] {
                adjacency[first].push((second, [p, q]));
                adjacency[second].push((first, [p, q]));
            }
        }
    }
    adjacency
}

/// Connected components of the adjacency graph, each listed in ascending triangle order.
fn split_groups(adjacency: &[Vec<(usize, [usize; 2])>]) -> Vec<Vec<usize>> {
    let mut assigned = vec![false; adjacency.len()];
    let mut groups = Vec::new();

    for seed in 0..adjacency.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];
        let mut queue = VecDeque::from([seed]);
        while let Some(tri) = queue.pop_front() {
            for &(other, _) in &adjacency[tri] {
                if !assigned[other] {
                    assigned[other] = true;
                    members.push(other);
                    queue.push_back(other);
                }
            }
        }
        members.sort_unstable();
        groups.push(members);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_builds_two_linked_nodes() {
        let zone = Zone::build(&NavMeshGeometry::floor(point![0.0, 0.0, 0.0], 5.0)).unwrap();
        assert_eq!(zone.group_count(), 1);
        let nodes = zone.group(0).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].neighbours, vec![1]);
        assert_eq!(nodes[1].neighbours, vec![0]);
        assert!(nodes[0].portal_to(1).is_some());
    }

    #[test]
    fn duplicated_vertices_are_welded() {
        // Two triangles that do not share indices but do share an edge geometrically.
        let geometry = NavMeshGeometry::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 0.0, 1.0],
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0],
            ],
            vec![0, 1, 2, 3, 4, 5],
        );
        let zone = Zone::build(&geometry).unwrap();
        assert_eq!(zone.vertices().len(), 4);
        assert_eq!(zone.group_count(), 1);
    }

    #[test]
    fn degenerate_triangles_are_dropped() {
        let geometry = NavMeshGeometry::new(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            vec![0, 1, 2, 0, 3, 1],
        );
        let zone = Zone::build(&geometry).unwrap();
        assert_eq!(zone.node_count(), 1);
    }

    #[test]
    fn rejects_out_of_range_index() {
        let geometry = NavMeshGeometry::new(vec![[0.0, 0.0, 0.0]], vec![0, 1, 2]);
        assert!(matches!(
            Zone::build(&geometry),
            Err(CoreError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn rejects_partial_face() {
        let geometry = NavMeshGeometry::new(vec![[0.0; 3], [1.0, 0.0, 0.0]], vec![0, 1]);
        assert!(matches!(
            Zone::build(&geometry),
            Err(CoreError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn rejects_empty_mesh() {
        assert!(Zone::build(&NavMeshGeometry::default()).is_err());
    }
}
