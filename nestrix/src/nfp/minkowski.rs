//! Minkowski sums of convex polygons by the rotating edge-vector merge.

use crate::geometry::primitives::Point;

/// Computes the Minkowski sum of two convex counterclockwise polygons.
/// The result is convex, counterclockwise and has at most `|p| + |q|` vertices.
pub fn minkowski_sum_convex(p: &[Point], q: &[Point]) -> Vec<Point> {
    let p = rotate_to_bottom_most(p);
    let q = rotate_to_bottom_most(q);
    let (n, m) = (p.len(), q.len());

    let edge = |pts: &[Point], i: usize| -> Point {
        let a = pts[i % pts.len()];
        let b = pts[(i + 1) % pts.len()];
        Point(b.0 - a.0, b.1 - a.1)
    };

    let mut result = Vec::with_capacity(n + m);
    let mut cur = Point(p[0].0 + q[0].0, p[0].1 + q[0].1);
    result.push(cur);

    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        //edge vectors are sorted by polar angle starting from the bottom-most vertex;
        //always advance along the edge with the smaller angle
        let take_p = match (i < n, j < m) {
            (true, false) => true,
            (false, true) => false,
            _ => {
                let ep = edge(&p, i);
                let eq = edge(&q, j);
                ep.0 * eq.1 - ep.1 * eq.0 >= 0.0
            }
            ,
        };
        let e = match take_p {
            true => {
                let e = edge(&p, i);
                i += 1;
                e
            }
            false => {
                let e = edge(&q, j);
                j += 1;
                e
            }
        };
        cur = Point(cur.0 + e.0, cur.1 + e.1);
        result.push(cur);
    }

    //the walk closes back onto the start vertex
    result.pop();
    result
}

/// Reindexes a convex counterclockwise polygon to start at its bottom-most
/// (then left-most) vertex, so that edge angles increase monotonically.
fn rotate_to_bottom_most(points: &[Point]) -> Vec<Point> {
    let start = points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (a.1, a.0).partial_cmp(&(b.1, b.0)).unwrap())
        .map(|(i, _)| i)
        .expect("empty polygon");
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[start..]);
    rotated.extend_from_slice(&points[..start]);
    rotated
}
