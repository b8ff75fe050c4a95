//! The no-fit polygon engine.
//!
//! For a stationary polygon A and an orbiting polygon B, the no-fit polygon `NFP(A, B)`
//! is the locus of positions of B's reference vertex where B touches but does not
//! overlap A. This module computes the *forbidden region* (whose boundary is the NFP)
//! as a Minkowski sum over convex decompositions, assembled with boolean clipping:
//!
//! `Forbidden(A, B) = ⋃ convᵢ(A) ⊕ −convⱼ(B)  ∖  ⋃_H fit(H, B)  ∖  ⋃_G −fit(G, A)`
//!
//! where H ranges over the holes of A (B nesting inside A) and G over the holes of B
//! (A being swallowed by B). All results are checked against orientation and finiteness
//! post-conditions; a violation is reported as [`NfpError`] so the caller can skip the
//! affected placement attempt instead of producing an invalid packing.

mod cache;
mod decompose;
mod minkowski;

#[doc(inline)]
pub use cache::{NfpKey, RotKey, ShapeId, State, shape_fingerprint};
#[doc(inline)]
pub use decompose::convex_partition;
#[doc(inline)]
pub use minkowski::minkowski_sum_convex;

use std::fmt::Display;

use crate::boolean;
use crate::fsize;
use crate::geometry::primitives::{Polygon, Rect, Ring};

/// A computed no-fit polygon: the forbidden region of orbiter reference-point positions.
/// May be disconnected and may contain holes (feasible pockets).
#[derive(Clone, Debug)]
pub struct Nfp {
    pub regions: Vec<Polygon>,
}

/// Numeric failure inside the NFP kernel, detected by post-condition checks.
#[derive(Clone, Debug)]
pub struct NfpError {
    reason: String,
}

impl NfpError {
    pub fn new(reason: impl Into<String>) -> Self {
        NfpError {
            reason: reason.into(),
        }
    }
}

impl Display for NfpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NFP computation failed: {}", self.reason)
    }
}

impl std::error::Error for NfpError {}

pub type NfpResult<T> = Result<T, NfpError>;

/// Computes the no-fit polygon of `orbiter` around `stationary`.
///
/// `orbiter` must be in its normalized pose: rotated as desired and translated so its
/// reference vertex lies at the origin. The result is expressed in absolute positions
/// of that reference vertex, for `stationary` at its given coordinates.
pub fn no_fit_polygon(stationary: &Polygon, orbiter: &Polygon) -> NfpResult<Nfp> {
    let conv_stat = convex_partition(&Polygon::simple(stationary.outer.clone()))
        .map_err(|e| NfpError::new(format!("decomposing stationary: {e}")))?;
    let conv_orb = convex_partition(&Polygon::simple(orbiter.outer.reflected()))
        .map_err(|e| NfpError::new(format!("decomposing orbiter: {e}")))?;

    let mut pieces = Vec::with_capacity(conv_stat.len() * conv_orb.len());
    for a in &conv_stat {
        for b in &conv_orb {
            let sum = minkowski_sum_convex(a, b);
            if let Ok(ring) = Ring::try_new(sum) {
                pieces.push(vec![Polygon::simple(ring)]);
            }
        }
    }
    let mut forbidden = boolean::union_all(pieces);

    //positions where the orbiter nests entirely inside a hole of the stationary
    for hole in &stationary.holes {
        let fit = fit_region(hole, &orbiter.outer)?;
        if !fit.is_empty() {
            forbidden = boolean::difference(&forbidden, &fit);
        }
    }

    //positions where the stationary is swallowed entirely by a hole of the orbiter
    for hole in &orbiter.holes {
        let fit = reflect_region(&fit_region(hole, &stationary.outer)?);
        if !fit.is_empty() {
            forbidden = boolean::difference(&forbidden, &fit);
        }
    }

    validate_region(&forbidden)?;
    Ok(Nfp { regions: forbidden })
}

/// The inner-fit rectangle of a normalized orbiter in a container rectangle: the set of
/// reference-vertex positions for which the orbiter lies entirely within the container.
/// `None` if the orbiter does not fit at all.
pub fn inner_fit_rect(container: &Rect, orbiter: &Polygon) -> Option<Rect> {
    let bb = orbiter.outer.bbox;
    Rect::try_new(
        container.x_min - bb.x_min,
        container.y_min - bb.y_min,
        container.x_max - bb.x_max,
        container.y_max - bb.y_max,
    )
    .ok()
}

/// The fit region `{t : shape + t ⊆ hole}`: all translations placing `shape` entirely
/// inside the disk enclosed by `hole`. Computed through the complement: a translation is
/// infeasible iff the translated shape meets the region outside the hole.
pub fn fit_region(hole: &Ring, shape: &Ring) -> NfpResult<Vec<Polygon>> {
    //work with the shape anchored at its first vertex, so the origin lies on the shape
    //and every unblocked translation inside the probe box is genuinely contained
    let v0 = shape.points[0];
    let shape0 = shape.translated(-v0.0, -v0.1);

    let reach = shape0
        .bbox
        .x_min
        .abs()
        .max(shape0.bbox.x_max.abs())
        .max(shape0.bbox.y_min.abs())
        .max(shape0.bbox.y_max.abs());
    let margin = reach + 1.0;
    let probe_box = hole
        .bbox
        .resize_by(margin, margin)
        .expect("positive margin cannot invalidate a bbox");
    let box_ring = Ring::try_new(probe_box.corners().to_vec()).expect("box corners form a ring");

    let complement =
        Polygon::try_new(box_ring, vec![hole.clone().oriented(false)]).map_err(|e| {
            NfpError::new(format!("building hole complement: {e}"))
        })?;

    let conv_comp = convex_partition(&complement)
        .map_err(|e| NfpError::new(format!("decomposing hole complement: {e}")))?;
    let conv_shape = convex_partition(&Polygon::simple(shape0.reflected()))
        .map_err(|e| NfpError::new(format!("decomposing fitted shape: {e}")))?;

    let mut pieces = Vec::with_capacity(conv_comp.len() * conv_shape.len());
    for a in &conv_comp {
        for b in &conv_shape {
            let sum = minkowski_sum_convex(a, b);
            if let Ok(ring) = Ring::try_new(sum) {
                pieces.push(vec![Polygon::simple(ring)]);
            }
        }
    }
    let blocked = boolean::union_all(pieces);
    let fit0 = boolean::difference(&[Polygon::from(probe_box)], &blocked);

    //shift back from the anchored shape to the original one: t = t0 − v0
    Ok(translate_region(&fit0, -v0.0, -v0.1))
}

/// Translates every polygon of a region by `(dx, dy)`.
pub fn translate_region(region: &[Polygon], dx: fsize, dy: fsize) -> Vec<Polygon> {
    region.iter().map(|p| p.translated(dx, dy)).collect()
}

/// Point-reflects every polygon of a region through the origin.
pub fn reflect_region(region: &[Polygon]) -> Vec<Polygon> {
    region
        .iter()
        .map(|p| Polygon {
            outer: p.outer.reflected(),
            holes: p.holes.iter().map(|h| h.reflected()).collect(),
        })
        .collect()
}

/// Post-condition checks on a region produced by the kernel: finite coordinates,
/// positively oriented outer rings and negatively oriented holes.
fn validate_region(region: &[Polygon]) -> NfpResult<()> {
    for poly in region {
        for ring in poly.rings() {
            if ring
                .points
                .iter()
                .any(|p| !p.0.is_finite() || !p.1.is_finite())
            {
                return Err(NfpError::new("non-finite coordinate in result"));
            }
        }
        if !poly.outer.is_positive() {
            return Err(NfpError::new("outer ring orientation inverted"));
        }
        if poly.holes.iter().any(|h| h.is_positive()) {
            return Err(NfpError::new("hole ring orientation inverted"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boolean::region_area;
    use crate::geometry::geo_traits::Shape;
    use crate::geometry::primitives::Point;
    use float_cmp::assert_approx_eq;

    fn square_poly(x: fsize, y: fsize, size: fsize) -> Polygon {
        Polygon::simple(
            Ring::try_new(vec![
                Point(x, y),
                Point(x + size, y),
                Point(x + size, y + size),
                Point(x, y + size),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_nfp_two_squares() {
        //stationary 4x4 at origin, orbiter 2x2 anchored at its bottom-left corner:
        //the forbidden region of the reference vertex is a 6x6 square from (-2,-2)
        let stationary = square_poly(0.0, 0.0, 4.0);
        let orbiter = square_poly(0.0, 0.0, 2.0);

        let nfp = no_fit_polygon(&stationary, &orbiter).unwrap();
        assert_eq!(nfp.regions.len(), 1);
        let bbox = nfp.regions[0].bbox();
        assert_approx_eq!(fsize, bbox.x_min, -2.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, bbox.y_min, -2.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, bbox.x_max, 4.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, bbox.y_max, 4.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, region_area(&nfp.regions), 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nfp_convex_vertex_bound() {
        let stationary = square_poly(0.0, 0.0, 4.0);
        let orbiter = Polygon::simple(
            Ring::try_new(vec![Point(0.0, 0.0), Point(1.0, 0.0), Point(0.5, 1.0)]).unwrap(),
        );
        let nfp = no_fit_polygon(&stationary, &orbiter).unwrap();
        //for convex A and B the NFP has at most |A| + |B| vertices
        assert_eq!(nfp.regions.len(), 1);
        assert!(nfp.regions[0].outer.n_points() <= 7);
    }

    #[test]
    fn test_nfp_hole_admits_small_orbiter() {
        //ring-shaped stationary: 10x10 outer with an 8x8 hole; a 2x2 orbiter can nest
        let outer = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let hole = Ring::try_new(vec![
            Point(1.0, 1.0),
            Point(9.0, 1.0),
            Point(9.0, 9.0),
            Point(1.0, 9.0),
        ])
        .unwrap();
        let stationary = Polygon::try_new(outer, vec![hole]).unwrap();
        let orbiter = square_poly(0.0, 0.0, 2.0);

        let nfp = no_fit_polygon(&stationary, &orbiter).unwrap();
        //the center of the hole must be feasible: reference at (3,3) puts the 2x2
        //orbiter at [3,5]x[3,5], well inside the hole
        let center_feasible = !nfp
            .regions
            .iter()
            .any(|p| p.contains(&Point(3.0, 3.0)));
        assert!(center_feasible, "orbiter must be able to nest in the hole");
        //a position overlapping the ring material must be forbidden
        let on_material = nfp
            .regions
            .iter()
            .any(|p| p.contains(&Point(-0.5, -0.5)));
        assert!(on_material);
    }

    #[test]
    fn test_fit_region_square_in_square() {
        //a 2x2 shape anchored at its corner fits in an 8x8 hole: translations form a
        //6x6 square
        let hole = Ring::try_new(vec![
            Point(1.0, 1.0),
            Point(9.0, 1.0),
            Point(9.0, 9.0),
            Point(1.0, 9.0),
        ])
        .unwrap();
        let shape = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(2.0, 0.0),
            Point(2.0, 2.0),
            Point(0.0, 2.0),
        ])
        .unwrap();
        let fit = fit_region(&hole, &shape).unwrap();
        assert_approx_eq!(fsize, region_area(&fit), 36.0, epsilon = 1e-6);
        let bbox = fit[0].bbox();
        assert_approx_eq!(fsize, bbox.x_min, 1.0, epsilon = 1e-6);
        assert_approx_eq!(fsize, bbox.x_max, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fit_region_too_large_is_empty() {
        let hole = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(2.0, 0.0),
            Point(2.0, 2.0),
            Point(0.0, 2.0),
        ])
        .unwrap();
        let shape = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(3.0, 0.0),
            Point(3.0, 3.0),
            Point(0.0, 3.0),
        ])
        .unwrap();
        let fit = fit_region(&hole, &shape).unwrap();
        assert!(fit.is_empty() || region_area(&fit) < 1e-9);
    }

    #[test]
    fn test_inner_fit_rect() {
        let container = Rect::try_new(0.0, 0.0, 10.0, 10.0).unwrap();
        let orbiter = square_poly(0.0, 0.0, 4.0);
        let ifp = inner_fit_rect(&container, &orbiter).unwrap();
        assert_approx_eq!(fsize, ifp.x_min, 0.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, ifp.x_max, 6.0, epsilon = 1e-9);

        let too_big = square_poly(0.0, 0.0, 11.0);
        assert!(inner_fit_rect(&container, &too_big).is_none());
    }

    #[test]
    fn test_nfp_determinism() {
        let stationary = square_poly(0.0, 0.0, 4.0);
        let orbiter = square_poly(0.0, 0.0, 2.0);
        let nfp1 = no_fit_polygon(&stationary, &orbiter).unwrap();
        let nfp2 = no_fit_polygon(&stationary, &orbiter).unwrap();
        assert_eq!(nfp1.regions.len(), nfp2.regions.len());
        for (p1, p2) in nfp1.regions.iter().zip(nfp2.regions.iter()) {
            assert_eq!(p1.outer.points, p2.outer.points);
        }
    }
}
