/*!
Navigation mesh zones and path queries.

A zone is built once from walkable-surface triangles and registered under a name. Path queries
then run entirely against the in-memory zone:

- build:   vertex merging, triangle adjacency, portals and connected groups
- astar:   node-graph search between the start and end nodes
- funnel:  string pulling through the portals of the node route

Paths returned by [`Pathfinding::find_path`] exclude the start point and end exactly on the
requested target. A target that is not on a triangle of the searched group is unreachable.
*/

mod astar;
mod build;
mod funnel;

use std::collections::HashMap;

use nalgebra::Point3;

use crate::{
    constants::NAVMESH_HEIGHT_TOLERANCE,
    error::{CoreError, Result},
};

pub use build::NavMeshGeometry;
use funnel::{Channel, point_in_triangle_xz, triarea2};

/// Index of a connected group of nodes inside a zone.
pub type GroupId = usize;

/// One walkable triangle of a zone.
#[derive(Clone, Debug, PartialEq)]
pub struct NavNode {
    /// Index of this node inside its group.
    pub id: usize,
    /// Indices into [`Zone::vertices`].
    pub vertex_ids: [usize; 3],
    pub centroid: Point3<f32>,
    /// Ids (within the same group) of nodes sharing an edge with this one.
    pub neighbours: Vec<usize>,
    /// Shared edge per neighbour, parallel to `neighbours`.
    pub portals: Vec<[usize; 2]>,
}

impl NavNode {
    /// The shared edge leading to `neighbour`, if the two nodes are adjacent.
    pub fn portal_to(&self, neighbour: usize) -> Option<[usize; 2]> {
        self.neighbours
            .iter()
            .position(|&id| id == neighbour)
            .and_then(|slot| self.portals.get(slot).copied())
    }
}

/// Precomputed navigable surface.
#[derive(Clone, Debug, Default)]
pub struct Zone {
    vertices: Vec<Point3<f32>>,
    groups: Vec<Vec<NavNode>>,
}

impl Zone {
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn group(&self, group: GroupId) -> Option<&[NavNode]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn node_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    fn triangle(&self, node: &NavNode) -> [Point3<f32>; 3] {
        let [a, b, c] = node.vertex_ids;
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    fn contains_xz(&self, node: &NavNode, position: &Point3<f32>) -> bool {
        let [a, b, c] = self.triangle(node);
        point_in_triangle_xz(position, &a, &b, &c)
    }

    /// Height of the node's triangle plane below `position`; `None` for vertical triangles.
    fn surface_height(&self, node: &NavNode, position: &Point3<f32>) -> Option<f32> {
        let [a, b, c] = self.triangle(node);
        let normal = (b - a).cross(&(c - a));
        if normal.y.abs() <= f32::EPSILON {
            return None;
        }
        Some(a.y - (normal.x * (position.x - a.x) + normal.z * (position.z - a.z)) / normal.y)
    }

    /// Whether `position` lies on one of `nodes`, at most `tolerance` above or below it.
    fn on_surface(&self, nodes: &[NavNode], position: &Point3<f32>, tolerance: f32) -> bool {
        nodes.iter().any(|node| {
            self.contains_xz(node, position)
                && self
                    .surface_height(node, position)
                    .is_some_and(|height| (height - position.y).abs() <= tolerance)
        })
    }

    /// Pick the best node among `candidates` for `position`.
    ///
    /// With `check_polygon`, a node whose triangle contains the point (XZ) wins, nearest in height
    /// first. Otherwise, or when no triangle contains it, the nearest centroid wins.
    fn closest_among<'a, I>(
        &'a self,
        candidates: I,
        position: &Point3<f32>,
        check_polygon: bool,
    ) -> Option<(GroupId, &'a NavNode)>
    where
        I: Iterator<Item = (GroupId, &'a NavNode)>,
    {
        let mut containing: Option<(f32, GroupId, &NavNode)> = None;
        let mut nearest: Option<(f32, GroupId, &NavNode)> = None;

        for (group, node) in candidates {
            if check_polygon && self.contains_xz(node, position) {
                let dy = (node.centroid.y - position.y).abs();
                if containing.is_none_or(|(best, _, _)| dy < best) {
                    containing = Some((dy, group, node));
                }
            }

            let dist_sq = (node.centroid - position).norm_squared();
            if nearest.is_none_or(|(best, _, _)| dist_sq < best) {
                nearest = Some((dist_sq, group, node));
            }
        }

        containing
            .or(nearest)
            .map(|(_, group, node)| (group, node))
    }

    fn all_nodes(&self) -> impl Iterator<Item = (GroupId, &NavNode)> {
        self.groups
            .iter()
            .enumerate()
            .flat_map(|(group, nodes)| nodes.iter().map(move |node| (group, node)))
    }
}

/// Path queries the waypoint follower depends on.
///
/// Implementations may fail; the follower treats every error as "do not move".
pub trait PathQuery {
    /// Group of the zone the agent currently stands in.
    fn group_for(&self, zone: &str, position: &Point3<f32>) -> Result<GroupId>;

    /// Waypoints from `start` to `end`, excluding `start`, or `None` when unreachable.
    fn find_path(
        &self,
        start: &Point3<f32>,
        end: &Point3<f32>,
        zone: &str,
        group: GroupId,
    ) -> Result<Option<Vec<Point3<f32>>>>;
}

/// Registry of named zones plus the queries over them.
#[derive(Clone, Debug, Default)]
pub struct Pathfinding {
    zones: HashMap<String, Zone>,
}

impl Pathfinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a zone under `name`.
    pub fn set_zone_data(&mut self, name: impl Into<String>, zone: Zone) {
        let name = name.into();
        log::info!(
            "Registered zone `{name}`: {} nodes in {} groups",
            zone.node_count(),
            zone.group_count()
        );
        self.zones.insert(name, zone);
    }

    pub fn zone(&self, name: &str) -> Result<&Zone> {
        self.zones
            .get(name)
            .ok_or_else(|| CoreError::UnknownZone(name.to_string()))
    }

    /// Group whose nearest node is closest to `position`.
    pub fn get_group(&self, zone: &str, position: &Point3<f32>) -> Result<GroupId> {
        let data = self.zone(zone)?;
        data.closest_among(data.all_nodes(), position, true)
            .map(|(group, _)| group)
            .ok_or_else(|| CoreError::InvalidGeometry(format!("zone `{zone}` has no nodes")))
    }

    /// Node of `group` closest to `position`.
    pub fn get_closest_node(
        &self,
        position: &Point3<f32>,
        zone: &str,
        group: GroupId,
        check_polygon: bool,
    ) -> Result<Option<&NavNode>> {
        let data = self.zone(zone)?;
        let nodes = group_nodes(data, zone, group)?;
        Ok(data
            .closest_among(nodes.iter().map(|node| (group, node)), position, check_polygon)
            .map(|(_, node)| node))
    }

    /// Shortest corridor path from `start` to `end` inside `group`, string-pulled.
    pub fn find_path(
        &self,
        start: &Point3<f32>,
        end: &Point3<f32>,
        zone: &str,
        group: GroupId,
    ) -> Result<Option<Vec<Point3<f32>>>> {
        let data = self.zone(zone)?;
        let nodes = group_nodes(data, zone, group)?;

        if !data.on_surface(nodes, end, NAVMESH_HEIGHT_TOLERANCE) {
            log::debug!("Target {end:?} is off group {group} of zone `{zone}`");
            return Ok(None);
        }

        let Some(start_node) = self.get_closest_node(start, zone, group, true)? else {
            return Ok(None);
        };
        let Some(end_node) = self.get_closest_node(end, zone, group, true)? else {
            return Ok(None);
        };
        let Some(route) = astar::search(nodes, start_node.id, end_node.id) else {
            log::debug!("No node route in zone `{zone}` group {group}");
            return Ok(None);
        };

        let mut channel = Channel::default();
        channel.push_point(*start);
        for pair in route.windows(2) {
            let (from, to) = (&nodes[pair[0]], &nodes[pair[1]]);
            let Some([p, q]) = from.portal_to(to.id) else {
                return Err(CoreError::InvalidGeometry(format!(
                    "nodes {} and {} in zone `{zone}` share no portal",
                    from.id, to.id
                )));
            };
            let (p, q) = (data.vertices[p], data.vertices[q]);

            // Orient the portal as seen walking from `from` into `to`.
            if triarea2(&from.centroid, &to.centroid, &p) > triarea2(&from.centroid, &to.centroid, &q)
            {
                channel.push(q, p);
            } else {
                channel.push(p, q);
            }
        }
        channel.push_point(*end);

        let mut path = channel.string_pull();
        if !path.is_empty() {
            path.remove(0);
        }
        if path.last().is_none_or(|last| !funnel::vequal(last, end)) {
            path.push(*end);
        }

        Ok(Some(path))
    }
}

impl PathQuery for Pathfinding {
    fn group_for(&self, zone: &str, position: &Point3<f32>) -> Result<GroupId> {
        self.get_group(zone, position)
    }

    fn find_path(
        &self,
        start: &Point3<f32>,
        end: &Point3<f32>,
        zone: &str,
        group: GroupId,
    ) -> Result<Option<Vec<Point3<f32>>>> {
        Pathfinding::find_path(self, start, end, zone, group)
    }
}

fn group_nodes<'a>(data: &'a Zone, zone: &str, group: GroupId) -> Result<&'a [NavNode]> {
    data.group(group).ok_or_else(|| CoreError::UnknownGroup {
        zone: zone.to_string(),
        group,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::point;

    /// Two 10x10 squares joined along x = 10, forming a 20x10 strip.
    fn strip() -> NavMeshGeometry {
        NavMeshGeometry::new(
            vec![
                [0.0, 0.0, 0.0],
                [10.0, 0.0, 0.0],
                [10.0, 0.0, 10.0],
                [0.0, 0.0, 10.0],
                [20.0, 0.0, 0.0],
                [20.0, 0.0, 10.0],
            ],
            vec![0, 1, 2, 0, 2, 3, 1, 4, 5, 1, 5, 2],
        )
    }

    /// L-shaped corridor: the straight line from the bottom-right arm to the top-left arm
    /// leaves the mesh, so the path must bend around the inner corner at (10, 10).
    fn l_corridor() -> NavMeshGeometry {
        NavMeshGeometry::new(
            vec![
                [0.0, 0.0, 0.0],   // 0
                [10.0, 0.0, 0.0],  // 1
                [30.0, 0.0, 0.0],  // 2
                [30.0, 0.0, 10.0], // 3
                [10.0, 0.0, 10.0], // 4
                [0.0, 0.0, 10.0],  // 5
                [0.0, 0.0, 30.0],  // 6
                [10.0, 0.0, 30.0], // 7
            ],
            vec![
                0, 1, 4, 0, 4, 5, // corner square
                1, 2, 3, 1, 3, 4, // +x arm
                5, 4, 7, 5, 7, 6, // +z arm
            ],
        )
    }

    fn registry(geometry: &NavMeshGeometry) -> Pathfinding {
        let mut pathfinding = Pathfinding::new();
        pathfinding.set_zone_data("level", Zone::build(geometry).expect("zone"));
        pathfinding
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let pathfinding = Pathfinding::new();
        let err = pathfinding
            .find_path(&point![0.0, 0.0, 0.0], &point![1.0, 0.0, 1.0], "nowhere", 0)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownZone(name) if name == "nowhere"));
    }

    #[test]
    fn unknown_group_is_an_error() {
        let pathfinding = registry(&strip());
        let err = pathfinding
            .find_path(&point![1.0, 0.0, 1.0], &point![2.0, 0.0, 2.0], "level", 7)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownGroup { group: 7, .. }));
    }

    #[test]
    fn path_within_one_triangle_is_just_the_target() {
        let pathfinding = registry(&strip());
        let path = pathfinding
            .find_path(&point![1.0, 0.0, 8.0], &point![2.0, 0.0, 9.0], "level", 0)
            .unwrap()
            .unwrap();
        assert_eq!(path, vec![point![2.0, 0.0, 9.0]]);
    }

    #[test]
    fn straight_line_across_convex_strip_has_no_intermediate_waypoints() {
        let pathfinding = registry(&strip());
        let path = pathfinding
            .find_path(&point![1.0, 0.0, 5.0], &point![19.0, 0.0, 5.0], "level", 0)
            .unwrap()
            .unwrap();
        assert_eq!(path.len(), 1);
        assert_relative_eq!(path[0], point![19.0, 0.0, 5.0]);
    }

    #[test]
    fn l_corridor_path_bends_at_inner_corner() {
        let pathfinding = registry(&l_corridor());
        let start = point![28.0, 0.0, 5.0];
        let end = point![5.0, 0.0, 28.0];
        let group = pathfinding.get_group("level", &start).unwrap();
        let path = pathfinding
            .find_path(&start, &end, "level", group)
            .unwrap()
            .unwrap();

        assert_eq!(path.len(), 2, "path: {path:?}");
        assert_relative_eq!(path[0], point![10.0, 0.0, 10.0]);
        assert_relative_eq!(path[1], end);
    }

    #[test]
    fn closest_node_prefers_containing_triangle() {
        let pathfinding = registry(&strip());
        let node = pathfinding
            .get_closest_node(&point![19.0, 0.0, 1.0], "level", 0, true)
            .unwrap()
            .unwrap();
        let zone = pathfinding.zone("level").unwrap();
        let [a, b, c] = zone.triangle(node);
        assert!(point_in_triangle_xz(&point![19.0, 0.0, 1.0], &a, &b, &c));
    }

    /// Two 10x10 squares 90 units apart.
    fn islands() -> NavMeshGeometry {
        NavMeshGeometry::new(
            vec![
                [0.0, 0.0, 0.0],
                [10.0, 0.0, 0.0],
                [10.0, 0.0, 10.0],
                [0.0, 0.0, 10.0],
                [100.0, 0.0, 0.0],
                [110.0, 0.0, 0.0],
                [110.0, 0.0, 10.0],
                [100.0, 0.0, 10.0],
            ],
            vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7],
        )
    }

    #[test]
    fn target_on_another_island_is_unreachable() {
        let pathfinding = registry(&islands());
        let start = point![5.0, 0.0, 5.0];
        let group = pathfinding.get_group("level", &start).unwrap();
        let path = pathfinding
            .find_path(&start, &point![105.0, 0.0, 5.0], "level", group)
            .unwrap();
        assert_eq!(path, None);
    }

    #[test]
    fn target_off_the_mesh_is_unreachable() {
        let pathfinding = registry(&strip());
        let path = pathfinding
            .find_path(&point![1.0, 0.0, 5.0], &point![25.0, 0.0, 5.0], "level", 0)
            .unwrap();
        assert_eq!(path, None);
    }

    #[test]
    fn target_high_above_the_mesh_is_unreachable() {
        let pathfinding = registry(&strip());
        let above = point![15.0, NAVMESH_HEIGHT_TOLERANCE * 4.0, 5.0];
        let slightly_above = point![15.0, NAVMESH_HEIGHT_TOLERANCE * 0.5, 5.0];

        let start = point![1.0, 0.0, 5.0];
        assert_eq!(pathfinding.find_path(&start, &above, "level", 0).unwrap(), None);
        assert!(
            pathfinding
                .find_path(&start, &slightly_above, "level", 0)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn disconnected_islands_form_separate_groups() {
        let geometry = NavMeshGeometry::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [50.0, 0.0, 50.0],
                [51.0, 0.0, 50.0],
                [50.0, 0.0, 51.0],
            ],
            vec![0, 2, 1, 3, 5, 4],
        );
        let pathfinding = registry(&geometry);
        let near = pathfinding
            .get_group("level", &point![0.2, 0.0, 0.2])
            .unwrap();
        let far = pathfinding
            .get_group("level", &point![50.2, 0.0, 50.2])
            .unwrap();
        assert_ne!(near, far);
        assert_eq!(pathfinding.zone("level").unwrap().group_count(), 2);
    }
}
