//! Funnel (string pulling) over a corridor of portals.
//!
//! All turning tests are done in the XZ plane; heights come from the portal endpoints.

use nalgebra::Point3;

const EQUAL_EPS_SQ: f32 = 1.0e-6;

/// Twice the signed XZ area of triangle `(a, b, c)`.
///
/// Positive when `c` lies to the right of the direction `a -> b`.
pub(super) fn triarea2(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> f32 {
    let (ax, az) = (b.x - a.x, b.z - a.z);
    let (bx, bz) = (c.x - a.x, c.z - a.z);
    bx * az - ax * bz
}

pub(super) fn vequal(a: &Point3<f32>, b: &Point3<f32>) -> bool {
    (a - b).norm_squared() < EQUAL_EPS_SQ
}

/// Inclusive point-in-triangle test on the XZ projection, independent of winding.
pub(super) fn point_in_triangle_xz(
    p: &Point3<f32>,
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
) -> bool {
    let d1 = triarea2(a, b, p);
    let d2 = triarea2(b, c, p);
    let d3 = triarea2(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Ordered `(left, right)` portal pairs, starting and ending with degenerate point portals.
#[derive(Debug, Default)]
pub(super) struct Channel {
    portals: Vec<(Point3<f32>, Point3<f32>)>,
}

impl Channel {
    pub(super) fn push(&mut self, left: Point3<f32>, right: Point3<f32>) {
        self.portals.push((left, right));
    }

    pub(super) fn push_point(&mut self, point: Point3<f32>) {
        self.portals.push((point, point));
    }

    /// Shortest polyline through the channel, including the first and last points.
    pub(super) fn string_pull(&self) -> Vec<Point3<f32>> {
        let Some(&(start, first_right)) = self.portals.first() else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut apex = start;
        let mut left = start;
        let mut right = first_right;
        let (mut apex_index, mut left_index, mut right_index) = (0, 0, 0);

        let mut i = 1;
        while i < self.portals.len() {
            let (next_left, next_right) = self.portals[i];

            if triarea2(&apex, &right, &next_right) <= 0.0 {
                if vequal(&apex, &right) || triarea2(&apex, &left, &next_right) > 0.0 {
                    right = next_right;
                    right_index = i;
                } else {
                    // Right crossed over left: left becomes the new apex.
                    path.push(left);
                    apex = left;
                    apex_index = left_index;
                    right = apex;
                    right_index = apex_index;
                    i = apex_index + 1;
                    continue;
                }
            }

            if triarea2(&apex, &left, &next_left) >= 0.0 {
                if vequal(&apex, &left) || triarea2(&apex, &right, &next_left) < 0.0 {
                    left = next_left;
                    left_index = i;
                } else {
                    path.push(right);
                    apex = right;
                    apex_index = right_index;
                    left = apex;
                    left_index = apex_index;
                    i = apex_index + 1;
                    continue;
                }
            }

            i += 1;
        }

        if let Some(&(end, _)) = self.portals.last() {
            if path.last().is_none_or(|last| !vequal(last, &end)) {
                path.push(end);
            }
        }

        path
    }
}
