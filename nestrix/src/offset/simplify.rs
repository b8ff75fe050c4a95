//! Ring simplification with a bounded Hausdorff error.

use crate::fsize;
use crate::geometry::geo_traits::DistanceTo;
use crate::geometry::primitives::{Edge, Point, Ring};

/// Simplifies a ring by removing collinear and near-collinear vertices, guaranteeing
/// that the simplified ring differs from the original by at most `tolerance` in
/// Hausdorff distance (Ramer–Douglas–Peucker on two anchored chains).
///
/// Returns `None` if the ring degenerates below three distinct vertices.
pub fn simplify_ring(ring: &Ring, tolerance: fsize) -> Option<Ring> {
    if tolerance <= 0.0 {
        return Some(ring.clone());
    }
    let points = &ring.points;

    //anchor the two chains at the lexicographically smallest vertex and at the vertex
    //furthest from it: both are guaranteed to survive, keeping the split stable
    let i0 = (0..points.len())
        .min_by(|&a, &b| {
            (points[a].0, points[a].1)
                .partial_cmp(&(points[b].0, points[b].1))
                .unwrap()
        })
        .unwrap();
    let i1 = (0..points.len())
        .max_by(|&a, &b| {
            points[i0]
                .sq_distance_to(&points[a])
                .partial_cmp(&points[i0].sq_distance_to(&points[b]))
                .unwrap()
        })
        .unwrap();
    if i0 == i1 {
        return None;
    }

    let chain_a = chain(points, i0, i1);
    let chain_b = chain(points, i1, i0);

    let mut simplified = Vec::with_capacity(points.len());
    rdp(&chain_a, tolerance, &mut simplified);
    simplified.pop(); //the junction vertex is the head of the second chain
    rdp(&chain_b, tolerance, &mut simplified);
    simplified.pop(); //implicit closing vertex

    Ring::try_new(simplified).ok()
}

/// The vertices from index `from` to index `to` (inclusive), walking forward and
/// wrapping around.
fn chain(points: &[Point], from: usize, to: usize) -> Vec<Point> {
    let n = points.len();
    let len = (to + n - from) % n + 1;
    (0..len).map(|k| points[(from + k) % n]).collect()
}

/// Ramer–Douglas–Peucker: appends the simplified chain (endpoints included) to `out`.
fn rdp(points: &[Point], tolerance: fsize, out: &mut Vec<Point>) {
    debug_assert!(points.len() >= 2);
    if points.len() == 2 {
        out.extend_from_slice(points);
        return;
    }

    let (first, last) = (points[0], points[points.len() - 1]);
    let (split, max_sq_dev) = match Edge::try_new(first, last) {
        Ok(edge) => (1..points.len() - 1)
            .map(|i| (i, edge.sq_distance_to(&points[i])))
            .max_by(|(_, d1), (_, d2)| d1.partial_cmp(d2).unwrap())
            .unwrap(),
        Err(_) => {
            //closed-back-on-itself chain: deviation relative to the point itself
            (1..points.len() - 1)
                .map(|i| (i, first.sq_distance_to(&points[i])))
                .max_by(|(_, d1), (_, d2)| d1.partial_cmp(d2).unwrap())
                .unwrap()
        }
    };

    if max_sq_dev <= tolerance * tolerance {
        out.push(first);
        out.push(last);
        return;
    }

    rdp(&points[..=split], tolerance, out);
    out.pop(); //split vertex would be duplicated
    rdp(&points[split..], tolerance, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geo_traits::Shape;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_collinear_vertices_removed() {
        let ring = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(5.0, 0.0),
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(5.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let simplified = simplify_ring(&ring, 0.01).unwrap();
        assert_eq!(simplified.n_points(), 4);
        assert_approx_eq!(fsize, simplified.area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_small_bumps_flattened() {
        let ring = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(5.0, 0.005), //bump below tolerance
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let simplified = simplify_ring(&ring, 0.01).unwrap();
        assert_eq!(simplified.n_points(), 4);
    }

    #[test]
    fn test_significant_vertices_kept() {
        let ring = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(5.0, 2.0), //well above tolerance
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let simplified = simplify_ring(&ring, 0.01).unwrap();
        assert_eq!(simplified.n_points(), 5);
    }

    #[test]
    fn test_hausdorff_bound() {
        //a noisy circle simplified at tolerance 0.05: every original vertex must stay
        //within 0.05 of the simplified outline
        let n = 256;
        let ring = Ring::try_new(
            (0..n)
                .map(|i| {
                    let a = 2.0 * std::f64::consts::PI * i as fsize / n as fsize;
                    let r = 10.0 + 0.01 * ((i * 7) % 3) as fsize;
                    Point(r * a.cos(), r * a.sin())
                })
                .collect(),
        )
        .unwrap();
        let tol = 0.05;
        let simplified = simplify_ring(&ring, tol).unwrap();
        assert!(simplified.n_points() < ring.n_points());
        for p in &ring.points {
            let min_dist = simplified
                .edge_iter()
                .map(|e| e.distance_to(p))
                .fold(fsize::MAX, fsize::min);
            assert!(min_dist <= tol + 1e-9, "vertex {p:?} deviates by {min_dist}");
        }
    }

    #[test]
    fn test_degenerate_returns_none() {
        let ring = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(10.0, 0.001),
            Point(20.0, 0.0),
            Point(10.0, -0.001),
        ])
        .unwrap();
        //simplifying a sliver at a coarse tolerance collapses it entirely
        assert!(simplify_ring(&ring, 1.0).is_none());
    }
}
