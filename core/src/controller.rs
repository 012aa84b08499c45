//! Click-to-move navigation: the single owner of agent, path and zone state.

use nalgebra::{Point3, Vector2};

use crate::{
    follower::{Agent, FollowerState, Path, TickOutcome, WaypointFollower},
    navmesh::PathQuery,
    pointer::{CameraProjection, RayCaster, resolve_target},
};

/// Result of handling one click.
#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    /// The pointer ray hit nothing; no query was issued.
    NoTarget,
    /// The pathfinder found no route; any previous path is dropped and the agent idles.
    Unreachable { target: Point3<f32> },
    /// The pathfinder failed; the previous path (if any) is kept.
    QueryFailed { target: Point3<f32> },
    /// A new path replaced whatever was being followed.
    Following {
        target: Point3<f32>,
        waypoints: usize,
    },
}

/// Routes the agent across a zone in response to clicks and frame ticks.
///
/// The pathfinder is injected; the scene is passed per click since it belongs to the renderer.
#[derive(Clone, Debug)]
pub struct NavigationController<P> {
    pathfinder: P,
    zone: String,
    follower: WaypointFollower,
}

impl<P: PathQuery> NavigationController<P> {
    pub fn new(pathfinder: P, zone: impl Into<String>, agent: Agent) -> Self {
        Self {
            pathfinder,
            zone: zone.into(),
            follower: WaypointFollower::new(agent),
        }
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn agent(&self) -> &Agent {
        self.follower.agent()
    }

    pub fn path(&self) -> Option<&Path> {
        self.follower.path()
    }

    pub fn state(&self) -> FollowerState {
        self.follower.state()
    }

    pub fn pathfinder(&self) -> &P {
        &self.pathfinder
    }

    pub fn pathfinder_mut(&mut self) -> &mut P {
        &mut self.pathfinder
    }

    /// Resolve a click in NDC against `scene` and, on a hit, route the agent there.
    pub fn handle_click<S>(
        &mut self,
        scene: &mut S,
        camera: &CameraProjection,
        ndc: &Vector2<f32>,
    ) -> ClickOutcome
    where
        S: RayCaster + ?Sized,
    {
        match resolve_target(scene, camera, ndc) {
            Some(target) => self.move_to(target),
            None => ClickOutcome::NoTarget,
        }
    }

    /// Query a path from the agent to `target` and follow it on success.
    pub fn move_to(&mut self, target: Point3<f32>) -> ClickOutcome {
        let start = self.follower.agent().position;

        let query = self
            .pathfinder
            .group_for(&self.zone, &start)
            .and_then(|group| {
                self.pathfinder
                    .find_path(&start, &target, &self.zone, group)
            });

        match query {
            Ok(Some(waypoints)) if !waypoints.is_empty() => {
                let count = waypoints.len();
                log::debug!("Following {count} waypoints toward {target:?}");
                self.follower.follow(Path::new(waypoints));
                ClickOutcome::Following {
                    target,
                    waypoints: count,
                }
            }
            Ok(_) => {
                log::info!("No path to {target:?} in zone `{}`", self.zone);
                self.follower.stop();
                ClickOutcome::Unreachable { target }
            }
            Err(err) => {
                log::warn!("Path query toward {target:?} failed: {err}");
                ClickOutcome::QueryFailed { target }
            }
        }
    }

    /// Advance the agent by one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        self.follower.tick(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::CoreError, navmesh::GroupId, pointer::RayCaster};
    use nalgebra::{Vector3, point, vector};
    use rapier3d::prelude::Ray;
    use std::cell::Cell;

    /// Straight-line pathfinder that counts calls and can be told to fail.
    #[derive(Default)]
    struct Scripted {
        calls: Cell<usize>,
        fail: bool,
        unreachable: bool,
    }

    impl PathQuery for Scripted {
        fn group_for(&self, _zone: &str, _position: &Point3<f32>) -> crate::Result<GroupId> {
            Ok(0)
        }

        fn find_path(
            &self,
            _start: &Point3<f32>,
            end: &Point3<f32>,
            zone: &str,
            _group: GroupId,
        ) -> crate::Result<Option<Vec<Point3<f32>>>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(CoreError::UnknownZone(zone.to_string()));
            }
            if self.unreachable {
                return Ok(None);
            }
            Ok(Some(vec![*end]))
        }
    }

    struct Hits(Option<Point3<f32>>);

    impl RayCaster for Hits {
        fn first_hit(&mut self, _ray: &Ray) -> Option<Point3<f32>> {
            self.0
        }
    }

    fn camera() -> CameraProjection {
        CameraProjection::new(
            &point![0.0, 10.0, 10.0],
            &point![0.0, 0.0, 0.0],
            &Vector3::y(),
            1.0,
            1.0,
            0.1,
            100.0,
        )
    }

    fn controller(pathfinder: Scripted) -> NavigationController<Scripted> {
        NavigationController::new(pathfinder, "zone", Agent::new(point![0.0, 0.0, 0.0], 10.0))
    }

    #[test]
    fn click_without_hit_issues_no_query() {
        let mut nav = controller(Scripted::default());
        let outcome = nav.handle_click(&mut Hits(None), &camera(), &vector![0.0, 0.0]);
        assert_eq!(outcome, ClickOutcome::NoTarget);
        assert_eq!(nav.pathfinder().calls.get(), 0);
        assert_eq!(nav.state(), FollowerState::Idle);
    }

    #[test]
    fn click_with_hit_starts_following() {
        let mut nav = controller(Scripted::default());
        let target = point![4.0, 0.0, 3.0];
        let outcome = nav.handle_click(&mut Hits(Some(target)), &camera(), &vector![0.1, -0.2]);
        assert_eq!(
            outcome,
            ClickOutcome::Following {
                target,
                waypoints: 1
            }
        );
        assert_eq!(nav.state(), FollowerState::Following);
    }

    #[test]
    fn failing_query_leaves_agent_untouched() {
        let mut nav = controller(Scripted {
            fail: true,
            ..Scripted::default()
        });
        let before = *nav.agent();
        let outcome = nav.move_to(point![4.0, 0.0, 3.0]);
        assert!(matches!(outcome, ClickOutcome::QueryFailed { .. }));
        nav.tick(1.0);
        assert_eq!(*nav.agent(), before);
        assert_eq!(nav.state(), FollowerState::Idle);
    }

    #[test]
    fn failing_query_keeps_path_in_flight() {
        let mut nav = controller(Scripted::default());
        nav.move_to(point![100.0, 0.0, 0.0]);
        nav.pathfinder_mut().fail = true;

        nav.move_to(point![-100.0, 0.0, 0.0]);

        assert_eq!(nav.state(), FollowerState::Following);
        assert_eq!(nav.path().and_then(Path::head), Some(&point![100.0, 0.0, 0.0]));
    }

    #[test]
    fn unreachable_target_keeps_agent_idle() {
        let mut nav = controller(Scripted {
            unreachable: true,
            ..Scripted::default()
        });
        let outcome = nav.move_to(point![1.0, 0.0, 1.0]);
        assert!(matches!(outcome, ClickOutcome::Unreachable { .. }));
        assert_eq!(nav.state(), FollowerState::Idle);
    }

    #[test]
    fn unreachable_target_drops_path_in_flight() {
        let mut nav = controller(Scripted::default());
        nav.move_to(point![100.0, 0.0, 0.0]);
        nav.tick(0.5);
        let stopped_at = nav.agent().position;
        nav.pathfinder_mut().unreachable = true;

        let outcome = nav.move_to(point![-100.0, 0.0, 0.0]);

        assert!(matches!(outcome, ClickOutcome::Unreachable { .. }));
        assert_eq!(nav.state(), FollowerState::Idle);
        assert!(nav.path().is_none());
        assert_eq!(nav.tick(0.5), TickOutcome::Idle);
        assert_eq!(nav.agent().position, stopped_at);
    }

    #[test]
    fn new_click_replaces_path() {
        let mut nav = controller(Scripted::default());
        nav.move_to(point![100.0, 0.0, 0.0]);
        nav.tick(0.5);
        nav.move_to(point![0.0, 0.0, -100.0]);

        let waypoints: Vec<_> = nav.path().unwrap().waypoints().copied().collect();
        assert_eq!(waypoints, vec![point![0.0, 0.0, -100.0]]);
    }
}
