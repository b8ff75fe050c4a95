//! Stitches the result segments of the sweep back into closed rings and recovers the
//! outer/hole nesting of the resulting region.

use std::collections::VecDeque;

use log::warn;

use crate::geometry::geo_traits::CollidesWith;
use crate::geometry::primitives::{Point, Polygon, Ring};

/// Connects loose segments into closed rings and assembles them into polygons with holes.
pub(super) fn assemble(segments: Vec<(Point, Point)>) -> Vec<Polygon> {
    let rings = connect_rings(segments);
    nest_rings(rings)
}

/// Chains segments into closed rings by matching endpoints exactly. Coincident vertices
/// are bit-identical by construction (the sweep snaps intersection points), so plain
/// equality is the correct join predicate.
fn connect_rings(segments: Vec<(Point, Point)>) -> Vec<Vec<Point>> {
    let mut open: Vec<VecDeque<Point>> = Vec::new();
    let mut closed: Vec<Vec<Point>> = Vec::new();

    for (a, b) in segments {
        if a == b {
            continue;
        }

        //attach the segment to an open chain, or start a new one
        let attached = open.iter().position(|chain| {
            *chain.front().unwrap() == a
                || *chain.front().unwrap() == b
                || *chain.back().unwrap() == a
                || *chain.back().unwrap() == b
        });

        let idx = match attached {
            None => {
                open.push(VecDeque::from([a, b]));
                open.len() - 1
            }
            Some(i) => {
                let chain = &mut open[i];
                if *chain.front().unwrap() == a {
                    chain.push_front(b);
                } else if *chain.front().unwrap() == b {
                    chain.push_front(a);
                } else if *chain.back().unwrap() == a {
                    chain.push_back(b);
                } else {
                    chain.push_back(a);
                }
                i
            }
        };

        //the extended chain may now close on itself or connect to another chain
        if open[idx].front() == open[idx].back() && open[idx].len() > 1 {
            let mut ring: Vec<Point> = open.swap_remove(idx).into();
            ring.pop();
            closed.extend(split_pinches(ring));
        } else if let Some(j) = (0..open.len()).find(|&j| {
            j != idx
                && (open[j].front() == open[idx].front()
                    || open[j].front() == open[idx].back()
                    || open[j].back() == open[idx].front()
                    || open[j].back() == open[idx].back())
        }) {
            let mut other = open.swap_remove(j.max(idx));
            let target = &mut open[j.min(idx)];
            //orient `other` so it extends the back of `target`
            if target.back() == other.back() || target.front() == other.front() {
                other = other.into_iter().rev().collect();
            }
            if target.back() == other.front() {
                other.pop_front();
                target.extend(other);
            } else {
                //other precedes target
                other.pop_back();
                for p in other.into_iter().rev() {
                    target.push_front(p);
                }
            }
            let t = j.min(idx);
            if open[t].front() == open[t].back() && open[t].len() > 1 {
                let mut ring: Vec<Point> = open.swap_remove(t).into();
                ring.pop();
                closed.extend(split_pinches(ring));
            }
        }
    }

    if !open.is_empty() {
        //should not happen on consistent sweep output
        warn!("{} unclosed chains left after reconnection", open.len());
    }

    closed
}

/// A ring that visits the same vertex twice is pinched; split it into simple sub-rings
/// at the repeated vertex.
fn split_pinches(ring: Vec<Point>) -> Vec<Vec<Point>> {
    for i in 0..ring.len() {
        for j in (i + 1)..ring.len() {
            if ring[i] == ring[j] {
                let inner: Vec<Point> = ring[i..j].to_vec();
                let mut outer: Vec<Point> = ring[..i].to_vec();
                outer.extend_from_slice(&ring[j..]);
                let mut result = split_pinches(inner);
                result.extend(split_pinches(outer));
                return result;
            }
        }
    }
    vec![ring]
}

/// Determines the nesting of the rings by containment depth: rings at even depth are
/// outer boundaries, rings at odd depth are holes of the deepest ring containing them.
fn nest_rings(raw_rings: Vec<Vec<Point>>) -> Vec<Polygon> {
    let rings: Vec<Ring> = raw_rings
        .into_iter()
        .filter_map(|pts| Ring::try_new(pts).ok())
        .collect();

    //probe with an edge midpoint: result segments only meet at their endpoints, so the
    //midpoint of an edge of one ring can never lie on the boundary of another
    let probes: Vec<Point> = rings
        .iter()
        .map(|r| r.get_edge(0).centroid())
        .collect();

    let depths: Vec<usize> = (0..rings.len())
        .map(|i| {
            (0..rings.len())
                .filter(|&j| j != i && rings[j].collides_with(&probes[i]))
                .count()
        })
        .collect();

    let mut polygons: Vec<(usize, Polygon)> = Vec::new(); //(ring index of outer, polygon)
    for (i, ring) in rings.iter().enumerate() {
        if depths[i] % 2 == 0 {
            polygons.push((i, Polygon::simple(ring.clone().oriented(true))));
        }
    }

    for (i, ring) in rings.iter().enumerate() {
        if depths[i] % 2 == 1 {
            //parent: the smallest even-depth ring that contains this hole
            let parent = polygons
                .iter_mut()
                .filter(|(j, _)| rings[*j].collides_with(&probes[i]))
                .min_by(|(j1, _), (j2, _)| {
                    rings[*j1]
                        .signed_area
                        .abs()
                        .partial_cmp(&rings[*j2].signed_area.abs())
                        .unwrap()
                });
            match parent {
                Some((_, poly)) => poly.holes.push(ring.clone().oriented(false)),
                None => warn!("hole ring without a containing outer ring"),
            }
        }
    }

    polygons.into_iter().map(|(_, poly)| poly).collect()
}
