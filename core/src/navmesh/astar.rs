use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::NavNode;

/// Open-set entry ordered so the heap pops the lowest `f` first.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Frontier {
    f: f32,
    node: usize,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* over node centroids. Returns node ids from `start` to `goal` inclusive.
pub(super) fn search(nodes: &[NavNode], start: usize, goal: usize) -> Option<Vec<usize>> {
    if start >= nodes.len() || goal >= nodes.len() {
        return None;
    }

    let heuristic = |id: usize| (nodes[goal].centroid - nodes[id].centroid).norm();

    let mut g_score = vec![f32::INFINITY; nodes.len()];
    let mut came_from: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut closed = vec![false; nodes.len()];
    let mut open = BinaryHeap::new();

    g_score[start] = 0.0;
    open.push(Frontier {
        f: heuristic(start),
        node: start,
    });

    while let Some(Frontier { node, .. }) = open.pop() {
        if node == goal {
            return Some(reconstruct(&came_from, goal));
        }
        if closed[node] {
            continue;
        }
        closed[node] = true;

        for &neighbour in &nodes[node].neighbours {
            if closed[neighbour] {
                continue;
            }
            let step = (nodes[neighbour].centroid - nodes[node].centroid).norm();
            let tentative = g_score[node] + step;
            if tentative < g_score[neighbour] {
                g_score[neighbour] = tentative;
                came_from[neighbour] = Some(node);
                open.push(Frontier {
                    f: tentative + heuristic(neighbour),
                    node: neighbour,
                });
            }
        }
    }

    None
}

fn reconstruct(came_from: &[Option<usize>], goal: usize) -> Vec<usize> {
    let mut route = vec![goal];
    let mut current = goal;
    while let Some(previous) = came_from[current] {
        route.push(previous);
        current = previous;
    }
    route.reverse();
    route
}
