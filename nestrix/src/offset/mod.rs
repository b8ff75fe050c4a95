//! Polygon dilation and erosion: the Minkowski sum/difference of a region with a disk
//! of radius `|d|`, rendered with flat caps and miter joins (miter limit 5, falling back
//! to a beveled square join beyond the limit) so the vertex count stays bounded for
//! spiky inputs.

mod simplify;

#[doc(inline)]
pub use simplify::simplify_ring;

use serde::{Deserialize, Serialize};

use crate::boolean;
use crate::fsize;
use crate::geometry::primitives::{Point, Polygon, Ring};

/// Whether to strictly inflate or deflate when offsetting a shape.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeModifyMode {
    /// Modify the shape to be strictly larger than the original (superset).
    Inflate,
    /// Modify the shape to be strictly smaller than the original (subset).
    Deflate,
}

/// Joins sharper than this are beveled instead of mitered.
pub const MITER_LIMIT: fsize = 5.0;

/// Offsets a ring by `distance`, outwards or inwards depending on the [`ShapeModifyMode`].
pub fn offset_ring(ring: &Ring, mode: ShapeModifyMode, distance: fsize) -> Vec<Polygon> {
    match mode {
        ShapeModifyMode::Inflate => dilate_ring(ring, distance),
        ShapeModifyMode::Deflate => erode_ring(ring, distance),
    }
}

/// Dilates the region enclosed by `ring` by `distance`.
/// The result is a single polygon region strictly containing the original.
pub fn dilate_ring(ring: &Ring, distance: fsize) -> Vec<Polygon> {
    if distance <= 0.0 {
        return vec![Polygon::simple(ring.clone())];
    }
    let ring = ring.clone().oriented(true);

    let mut pieces: Vec<Vec<Polygon>> = vec![vec![Polygon::simple(ring.clone())]];
    pieces.extend(
        offset_pieces(&ring.points, distance)
            .into_iter()
            .map(|p| vec![p]),
    );
    boolean::union_all(pieces)
}

/// Erodes the region enclosed by `ring` by `distance`. Erosion may shrink the region to
/// nothing (empty result) or split it into several components.
pub fn erode_ring(ring: &Ring, distance: fsize) -> Vec<Polygon> {
    if distance <= 0.0 {
        return vec![Polygon::simple(ring.clone())];
    }

    //complement trick: erode(A) = R ∖ dilate(R ∖ A), for a box R comfortably around A
    let margin = 2.0 * distance + 1.0;
    let bbox = ring
        .bbox
        .resize_by(margin, margin)
        .expect("positive margin cannot invalidate a bbox");
    let box_ring = Ring::try_new(bbox.corners().to_vec()).expect("bbox corners form a ring");
    let hole = ring.clone().oriented(false);

    let complement = match Polygon::try_new(box_ring, vec![hole.clone()]) {
        Ok(p) => p,
        Err(_) => return vec![],
    };

    let mut pieces: Vec<Vec<Polygon>> = vec![vec![complement]];
    //grow the complement across the hole boundary, into the region to be eroded
    pieces.extend(
        offset_pieces(&hole.points, distance)
            .into_iter()
            .map(|p| vec![p]),
    );
    let blocked = boolean::union_all(pieces);

    boolean::difference(&[Polygon::from(bbox)], &blocked)
}

/// Generates the dilation pieces along a ring traversal whose material lies to the left:
/// one rectangle per edge pushed outward (to the right), and a miter or bevel wedge at
/// every corner where the traversal turns left.
fn offset_pieces(points: &[Point], d: fsize) -> Vec<Polygon> {
    let n = points.len();
    let mut pieces = Vec::with_capacity(2 * n);

    let dir = |i: usize| -> Point {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
        let len = (dx * dx + dy * dy).sqrt();
        Point(dx / len, dy / len)
    };
    //outward normal: to the right of the traversal
    let normal = |u: Point| -> Point { Point(u.1, -u.0) };

    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let nrm = normal(dir(i));
        let quad = vec![
            p0,
            p1,
            Point(p1.0 + nrm.0 * d, p1.1 + nrm.1 * d),
            Point(p0.0 + nrm.0 * d, p0.1 + nrm.1 * d),
        ];
        if let Ok(ring) = Ring::try_new(quad) {
            pieces.push(Polygon::simple(ring));
        }
    }

    for i in 0..n {
        //corner at the start of edge i, between edge i-1 and edge i
        let v = points[i];
        let u0 = dir((i + n - 1) % n);
        let u1 = dir(i);
        let cross = u0.0 * u1.1 - u0.1 * u1.0;
        if cross <= 0.0 {
            //not turning left: the adjacent quads overlap, no gap to fill
            continue;
        }
        let n0 = normal(u0);
        let n1 = normal(u1);
        let a = Point(v.0 + n0.0 * d, v.1 + n0.1 * d);
        let b = Point(v.0 + n1.0 * d, v.1 + n1.1 * d);
        if a == b {
            continue;
        }

        //miter apex: intersection of the two offset edge lines
        let denom = u1.0 * u0.1 - u1.1 * u0.0;
        let wedge = if denom != 0.0 {
            let t = (u1.0 * (b.1 - a.1) - u1.1 * (b.0 - a.0)) / denom;
            let m = Point(a.0 + t * u0.0, a.1 + t * u0.1);
            let miter_len = ((m.0 - v.0).powi(2) + (m.1 - v.1).powi(2)).sqrt();
            match miter_len <= MITER_LIMIT * d {
                true => vec![v, a, m, b],
                false => vec![v, a, b], //beveled square join
            }
        } else {
            vec![v, a, b]
        };
        if let Ok(ring) = Ring::try_new(wedge) {
            pieces.push(Polygon::simple(ring));
        }
    }

    pieces
}
