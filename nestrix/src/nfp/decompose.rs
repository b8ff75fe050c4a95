//! Convex partitioning of polygons with holes: hole bridging, ear-clipping
//! triangulation and Hertel–Mehlhorn merging.

use anyhow::{Result, anyhow, ensure};
use itertools::Itertools;

use crate::boolean::signed_area3;
use crate::fsize;
use crate::geometry::primitives::{Point, Polygon};

/// Partitions a polygon (with holes) into convex pieces, each in counterclockwise order.
/// The pieces cover the polygon's material exactly and only share boundary edges.
pub fn convex_partition(poly: &Polygon) -> Result<Vec<Vec<Point>>> {
    let ring = match poly.holes.is_empty() {
        true => poly.outer.clone().oriented(true).points,
        false => bridge_holes(poly)?,
    };

    if poly.holes.is_empty() && is_convex(&ring) {
        return Ok(vec![ring]);
    }

    let triangles = ear_clip(&ring)?;
    Ok(hertel_mehlhorn(triangles))
}

/// True if the counterclockwise ring is convex (collinear vertices allowed).
pub fn is_convex(points: &[Point]) -> bool {
    let n = points.len();
    (0..n).all(|i| {
        signed_area3(points[i], points[(i + 1) % n], points[(i + 2) % n]) >= 0.0
    })
}

/// Merges the holes into the outer ring through bridge edges, producing a single
/// (weakly simple) counterclockwise ring that encloses the same material.
fn bridge_holes(poly: &Polygon) -> Result<Vec<Point>> {
    let mut outer = poly.outer.clone().oriented(true).points;

    //holes are bridged rightwards, so process them right-to-left
    let mut holes: Vec<Vec<Point>> = poly
        .holes
        .iter()
        .map(|h| h.clone().oriented(false).points)
        .collect();
    holes.sort_by(|a, b| {
        let max_x = |pts: &[Point]| {
            pts.iter()
                .map(|p| p.0)
                .fold(fsize::MIN, fsize::max)
        };
        max_x(b).partial_cmp(&max_x(a)).unwrap()
    });

    for hole in holes {
        outer = eliminate_hole(outer, hole)?;
    }
    Ok(outer)
}

/// Connects one hole to the outer ring with a bridge at a mutually visible vertex pair
/// (David Eberly's method, with the ray shot in the +x direction).
fn eliminate_hole(outer: Vec<Point>, hole: Vec<Point>) -> Result<Vec<Point>> {
    //hole vertex with the maximum x-coordinate
    let m_idx = hole
        .iter()
        .position_max_by(|a, b| (a.0, a.1).partial_cmp(&(b.0, b.1)).unwrap())
        .ok_or_else(|| anyhow!("empty hole"))?;
    let m = hole[m_idx];

    //closest intersection of the rightward ray from m with the outer ring
    let n = outer.len();
    let mut best: Option<(fsize, usize)> = None; //(intersection x, edge index)
    for i in 0..n {
        let a = outer[i];
        let b = outer[(i + 1) % n];
        if (a.1 > m.1) == (b.1 > m.1) {
            continue; //edge does not cross the ray's horizontal line
        }
        let x = a.0 + (m.1 - a.1) * (b.0 - a.0) / (b.1 - a.1);
        if x >= m.0 && best.is_none_or(|(bx, _)| x < bx) {
            best = Some((x, i));
        }
    }
    let (ix, edge_idx) = best.ok_or_else(|| anyhow!("hole is not enclosed by the outer ring"))?;
    let intersection = Point(ix, m.1);

    //candidate bridge vertex: the endpoint of the intersected edge with the larger x
    let (ea, eb) = (outer[edge_idx], outer[(edge_idx + 1) % n]);
    let mut bridge_idx = match ea.0 > eb.0 {
        true => edge_idx,
        false => (edge_idx + 1) % n,
    };

    //a reflex vertex inside the triangle (m, intersection, candidate) would block the
    //bridge; if any exists, bridge to the one minimizing the angle with the ray
    let candidate = outer[bridge_idx];
    let mut best_blocker: Option<(fsize, fsize, usize)> = None; //(tan of angle, distance, index)
    for i in 0..n {
        let p = outer[i];
        if p == candidate || p == m {
            continue;
        }
        let reflex = signed_area3(outer[(i + n - 1) % n], p, outer[(i + 1) % n]) < 0.0;
        if !reflex || !point_in_triangle(p, m, intersection, candidate) {
            continue;
        }
        let dx = p.0 - m.0;
        if dx <= 0.0 {
            continue;
        }
        let tan = (p.1 - m.1).abs() / dx;
        let dist = dx;
        let better = match best_blocker {
            None => true,
            Some((bt, bd, _)) => tan < bt || (tan == bt && dist < bd),
        };
        if better {
            best_blocker = Some((tan, dist, i));
        }
    }
    if let Some((_, _, i)) = best_blocker {
        bridge_idx = i;
    }

    //splice: outer up to the bridge vertex, around the hole starting at m, then back
    let mut merged = Vec::with_capacity(outer.len() + hole.len() + 2);
    merged.extend_from_slice(&outer[..=bridge_idx]);
    merged.extend(hole[m_idx..].iter().chain(hole[..=m_idx].iter()));
    merged.push(outer[bridge_idx]);
    merged.extend_from_slice(&outer[bridge_idx + 1..]);

    ensure!(
        merged.len() == outer.len() + hole.len() + 2,
        "bridge splice lost vertices"
    );
    Ok(merged)
}

fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    //sign-consistency test, boundary counts as inside
    let d1 = signed_area3(a, b, p);
    let d2 = signed_area3(b, c, p);
    let d3 = signed_area3(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Triangulates a (weakly simple) counterclockwise ring by ear clipping.
/// Degenerate (zero-area) ears are clipped but not emitted.
fn ear_clip(points: &[Point]) -> Result<Vec<[Point; 3]>> {
    let n = points.len();
    ensure!(n >= 3, "cannot triangulate fewer than 3 vertices");

    let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
    let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
    let mut alive: Vec<bool> = vec![true; n];
    let mut remaining = n;
    let mut triangles = Vec::with_capacity(n - 2);

    let mut cur = 0;
    let mut stall = 0;
    while remaining > 3 {
        if stall > remaining {
            //no clean ear found in a full loop: clip the flattest convex corner to
            //break the deadlock (caused by collinear bridge corridors)
            let fallback = (0..n)
                .filter(|&i| alive[i])
                .min_by(|&a, &b| {
                    let area_a = signed_area3(points[prev[a]], points[a], points[next[a]]).abs();
                    let area_b = signed_area3(points[prev[b]], points[b], points[next[b]]).abs();
                    area_a.partial_cmp(&area_b).unwrap()
                })
                .expect("no vertices left");
            cur = fallback;
            let (p, c, nx) = (prev[cur], cur, next[cur]);
            let area = signed_area3(points[p], points[c], points[nx]);
            if area > 0.0 {
                triangles.push([points[p], points[c], points[nx]]);
            }
            remove_vertex(&mut next, &mut prev, &mut alive, c);
            remaining -= 1;
            cur = nx;
            stall = 0;
            continue;
        }

        let (p, c, nx) = (prev[cur], cur, next[cur]);
        let area = signed_area3(points[p], points[c], points[nx]);

        if area == 0.0 {
            //degenerate corner (bridge corridor): clip without emitting
            remove_vertex(&mut next, &mut prev, &mut alive, c);
            remaining -= 1;
            cur = nx;
            stall = 0;
            continue;
        }

        let is_ear = area > 0.0
            && (0..n).all(|i| {
                if !alive[i] || i == p || i == c || i == nx {
                    return true;
                }
                let q = points[i];
                //coinciding vertices (bridge duplicates) never block an ear
                if q == points[p] || q == points[c] || q == points[nx] {
                    return true;
                }
                !point_in_triangle_strict(q, points[p], points[c], points[nx])
            });

        if is_ear {
            triangles.push([points[p], points[c], points[nx]]);
            remove_vertex(&mut next, &mut prev, &mut alive, c);
            remaining -= 1;
            cur = nx;
            stall = 0;
        } else {
            cur = next[cur];
            stall += 1;
        }
    }

    //final triangle
    let first = (0..n).position(|i| alive[i]).expect("no vertices left");
    let (p, c, nx) = (first, next[first], next[next[first]]);
    let area = signed_area3(points[p], points[c], points[nx]);
    if area > 0.0 {
        triangles.push([points[p], points[c], points[nx]]);
    }

    Ok(triangles)
}

fn point_in_triangle_strict(p: Point, a: Point, b: Point, c: Point) -> bool {
    let d1 = signed_area3(a, b, p);
    let d2 = signed_area3(b, c, p);
    let d3 = signed_area3(c, a, p);
    (d1 > 0.0 && d2 > 0.0 && d3 > 0.0) || (d1 < 0.0 && d2 < 0.0 && d3 < 0.0)
}

fn remove_vertex(next: &mut [usize], prev: &mut [usize], alive: &mut [bool], v: usize) {
    alive[v] = false;
    next[prev[v]] = next[v];
    prev[next[v]] = prev[v];
}

/// Greedily merges triangles sharing a diagonal into larger convex pieces
/// (Hertel–Mehlhorn).
fn hertel_mehlhorn(triangles: Vec<[Point; 3]>) -> Vec<Vec<Point>> {
    let mut pieces: Vec<Vec<Point>> = triangles.into_iter().map(|t| t.to_vec()).collect();

    'merge: loop {
        for i in 0..pieces.len() {
            for j in (i + 1)..pieces.len() {
                if let Some(merged) = try_merge(&pieces[i], &pieces[j]) {
                    pieces[i] = merged;
                    pieces.swap_remove(j);
                    continue 'merge;
                }
            }
        }
        break;
    }
    pieces
}

/// Merges two convex pieces along a shared (opposite-direction) edge if the union
/// remains convex.
fn try_merge(p1: &[Point], p2: &[Point]) -> Option<Vec<Point>> {
    let (n1, n2) = (p1.len(), p2.len());
    for k in 0..n1 {
        let (a, b) = (p1[k], p1[(k + 1) % n1]);
        for l in 0..n2 {
            if p2[l] == b && p2[(l + 1) % n2] == a {
                //walk p1 from b around to a, then p2's remaining vertices
                let mut merged = Vec::with_capacity(n1 + n2 - 2);
                for s in 0..n1 {
                    merged.push(p1[(k + 1 + s) % n1]);
                }
                for s in 2..n2 {
                    merged.push(p2[(l + s) % n2]);
                }
                if is_convex(&merged) {
                    return Some(merged);
                }
                return None;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::geo_traits::Shape;
    use crate::geometry::primitives::Ring;
    use float_cmp::assert_approx_eq;

    fn piece_area(piece: &[Point]) -> fsize {
        Ring::calculate_area(piece)
    }

    #[test]
    fn test_convex_passthrough() {
        let poly = Polygon::simple(
            Ring::try_new(vec![
                Point(0.0, 0.0),
                Point(4.0, 0.0),
                Point(4.0, 4.0),
                Point(0.0, 4.0),
            ])
            .unwrap(),
        );
        let pieces = convex_partition(&poly).unwrap();
        assert_eq!(pieces.len(), 1);
    }

    #[test]
    fn test_l_shape_partition() {
        let poly = Polygon::simple(
            Ring::try_new(vec![
                Point(0.0, 0.0),
                Point(4.0, 0.0),
                Point(4.0, 2.0),
                Point(2.0, 2.0),
                Point(2.0, 4.0),
                Point(0.0, 4.0),
            ])
            .unwrap(),
        );
        let pieces = convex_partition(&poly).unwrap();
        assert!(pieces.len() >= 2);
        let total: fsize = pieces.iter().map(|p| piece_area(p)).sum();
        assert_approx_eq!(fsize, total, 12.0, epsilon = 1e-9);
        assert!(pieces.iter().all(|p| is_convex(p)));
        assert!(pieces.iter().all(|p| piece_area(p) > 0.0));
    }

    #[test]
    fn test_partition_with_hole() {
        let outer = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let hole = Ring::try_new(vec![
            Point(4.0, 4.0),
            Point(6.0, 4.0),
            Point(6.0, 6.0),
            Point(4.0, 6.0),
        ])
        .unwrap();
        let poly = Polygon::try_new(outer, vec![hole]).unwrap();

        let pieces = convex_partition(&poly).unwrap();
        let total: fsize = pieces.iter().map(|p| piece_area(p)).sum();
        assert_approx_eq!(fsize, total, 96.0, epsilon = 1e-9);
        assert!(pieces.iter().all(|p| is_convex(p)));
    }

    #[test]
    fn test_partition_concave_blob() {
        //a star-ish concave octagon
        let poly = Polygon::simple(
            Ring::try_new(vec![
                Point(0.0, 0.0),
                Point(5.0, 2.0),
                Point(10.0, 0.0),
                Point(8.0, 5.0),
                Point(10.0, 10.0),
                Point(5.0, 8.0),
                Point(0.0, 10.0),
                Point(2.0, 5.0),
            ])
            .unwrap(),
        );
        let expected = poly.outer.area();
        let pieces = convex_partition(&poly).unwrap();
        let total: fsize = pieces.iter().map(|p| piece_area(p)).sum();
        assert_approx_eq!(fsize, total, expected, epsilon = 1e-9);
        assert!(pieces.iter().all(|p| is_convex(p)));
    }
}
