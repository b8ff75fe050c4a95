//! Boolean operations on polygonal regions.
//!
//! The kernel is a sweep-line clipper in the Martinez–Rueda formulation: segments of
//! both operands are subdivided at their intersections, classified by in/out transition
//! flags while the sweep line passes over them, and the surviving segments are stitched
//! back into rings. Ring nesting (outer vs hole) is recovered by containment depth.
//!
//! Operands are sets of [`Polygon`]s interpreted with even-odd filling; the result is
//! again a set of polygons with positively oriented outer rings and negatively oriented
//! holes. The kernel is deterministic: identical inputs produce identical output rings,
//! vertex for vertex.

mod connect;
mod sweep;

use crate::geometry::geo_traits::{CollidesWith, Shape};
use crate::geometry::primitives::{Point, Polygon, Rect};

pub(crate) use sweep::signed_area3;

/// The supported boolean operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    Intersection,
    Union,
    Difference,
}

/// Computes the union of two regions.
pub fn union(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => return b.to_vec(),
        (_, true) => return a.to_vec(),
        _ => {}
    }
    if region_bboxes_disjoint(a, b) {
        let mut out = a.to_vec();
        out.extend(b.iter().cloned());
        return out;
    }
    apply(a, b, BoolOp::Union)
}

/// Computes the intersection of two regions.
pub fn intersection(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    if a.is_empty() || b.is_empty() || region_bboxes_disjoint(a, b) {
        return vec![];
    }
    apply(a, b, BoolOp::Intersection)
}

/// Computes the difference of two regions: `a ∖ b`.
pub fn difference(a: &[Polygon], b: &[Polygon]) -> Vec<Polygon> {
    if a.is_empty() {
        return vec![];
    }
    if b.is_empty() || region_bboxes_disjoint(a, b) {
        return a.to_vec();
    }
    apply(a, b, BoolOp::Difference)
}

/// Unions an arbitrary number of regions, merging pairwise in a balanced tree to keep
/// the intermediate regions small.
pub fn union_all(mut regions: Vec<Vec<Polygon>>) -> Vec<Polygon> {
    while regions.len() > 1 {
        let mut merged = Vec::with_capacity(regions.len().div_ceil(2));
        let mut iter = regions.into_iter();
        while let Some(first) = iter.next() {
            match iter.next() {
                Some(second) => merged.push(union(&first, &second)),
                None => merged.push(first),
            }
        }
        regions = merged;
    }
    regions.pop().unwrap_or_default()
}

/// Total enclosed area of a region.
pub fn region_area(region: &[Polygon]) -> f64 {
    region.iter().map(|p| p.area()).sum()
}

fn apply(a: &[Polygon], b: &[Polygon], op: BoolOp) -> Vec<Polygon> {
    let subject = contours(a);
    let clipping = contours(b);
    let segments = sweep::compute_segments(&subject, &clipping, op);
    connect::assemble(segments)
}

fn contours(region: &[Polygon]) -> Vec<Vec<Point>> {
    region
        .iter()
        .flat_map(|poly| poly.rings())
        .map(|ring| ring.points.clone())
        .collect()
}

fn region_bbox(region: &[Polygon]) -> Option<Rect> {
    region
        .iter()
        .map(|p| p.bbox())
        .reduce(Rect::bounding_rect)
}

fn region_bboxes_disjoint(a: &[Polygon], b: &[Polygon]) -> bool {
    match (region_bbox(a), region_bbox(b)) {
        (Some(ba), Some(bb)) => !ba.collides_with(&bb),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::Ring;
    use float_cmp::assert_approx_eq;

    fn rect_poly(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Polygon {
        Polygon::from(Rect::try_new(x_min, y_min, x_max, y_max).unwrap())
    }

    #[test]
    fn test_union_disjoint() {
        let a = vec![rect_poly(0.0, 0.0, 1.0, 1.0)];
        let b = vec![rect_poly(5.0, 5.0, 6.0, 6.0)];
        let res = union(&a, &b);
        assert_eq!(res.len(), 2);
        assert_approx_eq!(f64, region_area(&res), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_overlapping() {
        let a = vec![rect_poly(0.0, 0.0, 2.0, 2.0)];
        let b = vec![rect_poly(1.0, 0.0, 3.0, 2.0)];
        let res = union(&a, &b);
        assert_eq!(res.len(), 1);
        assert!(res[0].holes.is_empty());
        assert_approx_eq!(f64, region_area(&res), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_shared_edge() {
        let a = vec![rect_poly(0.0, 0.0, 1.0, 1.0)];
        let b = vec![rect_poly(1.0, 0.0, 2.0, 1.0)];
        let res = union(&a, &b);
        assert_eq!(res.len(), 1);
        assert_approx_eq!(f64, region_area(&res), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersection() {
        let a = vec![rect_poly(0.0, 0.0, 2.0, 2.0)];
        let b = vec![rect_poly(1.0, 1.0, 3.0, 3.0)];
        let res = intersection(&a, &b);
        assert_eq!(res.len(), 1);
        assert_approx_eq!(f64, region_area(&res), 1.0, epsilon = 1e-9);
        let bbox = res[0].bbox();
        assert_approx_eq!(f64, bbox.x_min, 1.0, epsilon = 1e-9);
        assert_approx_eq!(f64, bbox.y_max, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_difference_creates_hole() {
        let a = vec![rect_poly(0.0, 0.0, 10.0, 10.0)];
        let b = vec![rect_poly(4.0, 4.0, 6.0, 6.0)];
        let res = difference(&a, &b);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].holes.len(), 1);
        assert_approx_eq!(f64, region_area(&res), 96.0, epsilon = 1e-9);
        assert!(res[0].outer.is_positive());
        assert!(!res[0].holes[0].is_positive());
    }

    #[test]
    fn test_difference_splits_region() {
        //subtracting a band through the middle splits the square in two
        let a = vec![rect_poly(0.0, 0.0, 10.0, 10.0)];
        let b = vec![rect_poly(4.0, -1.0, 6.0, 11.0)];
        let res = difference(&a, &b);
        assert_eq!(res.len(), 2);
        assert_approx_eq!(f64, region_area(&res), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn test_difference_consumes_subject() {
        let a = vec![rect_poly(2.0, 2.0, 3.0, 3.0)];
        let b = vec![rect_poly(0.0, 0.0, 10.0, 10.0)];
        let res = difference(&a, &b);
        assert!(res.is_empty() || region_area(&res) < 1e-9);
    }

    #[test]
    fn test_difference_with_subject_hole() {
        //a donut minus a bite out of its left side
        let outer = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let hole = Ring::try_new(vec![
            Point(3.0, 3.0),
            Point(7.0, 3.0),
            Point(7.0, 7.0),
            Point(3.0, 7.0),
        ])
        .unwrap();
        let donut = Polygon::try_new(outer, vec![hole]).unwrap();
        let bite = rect_poly(-1.0, 4.0, 2.0, 6.0);

        let res = difference(&[donut], &[bite]);
        let expected = (100.0 - 16.0) - (2.0 * 1.0 * 2.0);
        assert_approx_eq!(f64, region_area(&res), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_union_all_grid() {
        //3x3 grid of touching unit squares unions into one 3x3 square
        let mut pieces = vec![];
        for i in 0..3 {
            for j in 0..3 {
                pieces.push(vec![rect_poly(
                    i as f64,
                    j as f64,
                    (i + 1) as f64,
                    (j + 1) as f64,
                )]);
            }
        }
        let res = union_all(pieces);
        assert_approx_eq!(f64, region_area(&res), 9.0, epsilon = 1e-9);
        assert_eq!(res.len(), 1);
    }

    #[test]
    fn test_determinism() {
        let a = vec![rect_poly(0.0, 0.0, 2.0, 2.0)];
        let b = vec![rect_poly(1.0, 1.0, 3.0, 3.0)];
        let r1 = union(&a, &b);
        let r2 = union(&a, &b);
        assert_eq!(r1.len(), r2.len());
        for (p1, p2) in r1.iter().zip(r2.iter()) {
            assert_eq!(p1.outer.points, p2.outer.points);
        }
    }
}
