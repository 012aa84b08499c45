//! Per-tick waypoint following for the click-to-move agent.

use std::collections::VecDeque;

use nalgebra::Point3;

use crate::constants::WAYPOINT_REACHED_DISTANCE_SQ;

/// The moving avatar: a position and a constant speed (units per second).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Agent {
    pub position: Point3<f32>,
    pub speed: f32,
}

impl Agent {
    pub fn new(position: Point3<f32>, speed: f32) -> Self {
        Self {
            position,
            speed: speed.max(0.0),
        }
    }
}

/// Waypoints still to visit, front first. Never contains the start point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    waypoints: VecDeque<Point3<f32>>,
}

impl Path {
    pub fn new(waypoints: impl IntoIterator<Item = Point3<f32>>) -> Self {
        Self {
            waypoints: waypoints.into_iter().collect(),
        }
    }

    pub fn head(&self) -> Option<&Point3<f32>> {
        self.waypoints.front()
    }

    pub fn pop(&mut self) -> Option<Point3<f32>> {
        self.waypoints.pop_front()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &Point3<f32>> {
        self.waypoints.iter()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowerState {
    Idle,
    Following,
}

/// What a single [`WaypointFollower::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// No path; nothing moved.
    Idle,
    /// Moved toward the head waypoint.
    Moved { distance: f32 },
    /// Head waypoint reached and removed; `remaining` waypoints left.
    Reached { remaining: usize },
}

/// Owns the agent and its (at most one) active path.
#[derive(Clone, Debug)]
pub struct WaypointFollower {
    agent: Agent,
    path: Option<Path>,
}

impl WaypointFollower {
    pub fn new(agent: Agent) -> Self {
        Self { agent, path: None }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn state(&self) -> FollowerState {
        match &self.path {
            Some(path) if !path.is_empty() => FollowerState::Following,
            _ => FollowerState::Idle,
        }
    }

    /// Replace the active path. An empty path leaves the follower idle.
    pub fn follow(&mut self, path: Path) {
        self.path = (!path.is_empty()).then_some(path);
    }

    /// Drop the active path.
    pub fn stop(&mut self) {
        self.path = None;
    }

    /// Advance one frame.
    ///
    /// The reached-check runs once, before moving: if the head waypoint is within
    /// `WAYPOINT_REACHED_DISTANCE_SQ` it is popped and the agent does not move this tick.
    /// Otherwise the agent moves `min(speed * dt, distance)` straight toward it, so it never
    /// overshoots; a waypoint landed on exactly is popped on the following tick.
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        let Some(path) = self.path.as_mut() else {
            return TickOutcome::Idle;
        };
        let Some(head) = path.head().copied() else {
            self.path = None;
            return TickOutcome::Idle;
        };

        let delta = head - self.agent.position;
        let dist_sq = delta.norm_squared();

        if dist_sq > WAYPOINT_REACHED_DISTANCE_SQ {
            let dist = dist_sq.sqrt();
            let step = (self.agent.speed * dt.max(0.0)).min(dist);
            self.agent.position += delta * (step / dist);
            return TickOutcome::Moved { distance: step };
        }

        path.pop();
        let remaining = path.len();
        if remaining == 0 {
            self.path = None;
        }
        TickOutcome::Reached { remaining }
    }
}
