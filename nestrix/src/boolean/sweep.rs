//! The sweep phase of the clipper: event queue, status line and segment subdivision.

use std::cmp::Ordering;

use log::warn;

use crate::boolean::BoolOp;
use crate::fsize;
use crate::geometry::primitives::Point;

/// Twice the signed area of the triangle (p0, p1, p2).
/// Positive when p2 lies to the left of the directed line p0 → p1.
#[inline(always)]
pub(crate) fn signed_area3(p0: Point, p1: Point, p2: Point) -> fsize {
    (p1.0 - p0.0) * (p2.1 - p0.1) - (p2.0 - p0.0) * (p1.1 - p0.1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeType {
    Normal,
    NonContributing,
    SameTransition,
    DifferentTransition,
}

#[derive(Clone, Debug)]
struct SweepEvent {
    p: Point,
    /// True if `p` is the left (first processed) endpoint of the segment
    left: bool,
    /// Index of the event at the opposite endpoint
    other: usize,
    /// True if the segment belongs to the subject operand
    subject: bool,
    /// Input contour the segment originated from, used only as a deterministic tie-break
    contour_id: usize,
    edge_type: EdgeType,
    /// Whether a vertical ray shot upwards from inside the segment leaves its own operand
    in_out: bool,
    /// Same transition flag, but with respect to the other operand
    other_in_out: bool,
    /// Whether the segment is part of the result of the operation
    in_result: bool,
}

struct Sweep {
    events: Vec<SweepEvent>,
    /// Pending events, kept sorted in reverse processing order (next event last)
    queue: Vec<usize>,
}

impl Sweep {
    fn is_vertical(&self, e: usize) -> bool {
        self.events[e].p.0 == self.events[self.events[e].other].p.0
    }

    /// True if point `p` lies strictly to the left of the directed segment of `e`
    /// (above the segment, for a left-to-right segment).
    fn below(&self, e: usize, p: Point) -> bool {
        let ev = &self.events[e];
        let other = self.events[ev.other].p;
        match ev.left {
            true => signed_area3(ev.p, other, p) > 0.0,
            false => signed_area3(other, ev.p, p) > 0.0,
        }
    }

    /// Processing order of two events: `Less` means `a` is processed before `b`.
    fn compare_events(&self, a: usize, b: usize) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (ea, eb) = (&self.events[a], &self.events[b]);
        if ea.p.0 != eb.p.0 {
            return ea.p.0.partial_cmp(&eb.p.0).expect("NaN coordinate");
        }
        if ea.p.1 != eb.p.1 {
            return ea.p.1.partial_cmp(&eb.p.1).expect("NaN coordinate");
        }
        //same point: a right endpoint is processed before a left endpoint
        if ea.left != eb.left {
            return match ea.left {
                true => Ordering::Greater,
                false => Ordering::Less,
            };
        }
        //same point and same endpoint kind: the event of the bottom segment first
        let area = signed_area3(ea.p, self.events[ea.other].p, self.events[eb.other].p);
        if area != 0.0 {
            return match self.below(a, self.events[eb.other].p) {
                true => Ordering::Less,
                false => Ordering::Greater,
            };
        }
        //collinear: subject before clipping, then by contour for determinism
        match (ea.subject, eb.subject) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => ea
                .contour_id
                .cmp(&eb.contour_id)
                .then_with(|| a.cmp(&b)),
        }
    }

    /// Vertical order of two segments on the status line: true if `a` lies below `b`.
    fn segment_below(&self, a: usize, b: usize) -> bool {
        if a == b {
            return false;
        }
        let (ap, ao) = (self.events[a].p, self.events[self.events[a].other].p);
        let (bp, bo) = (self.events[b].p, self.events[self.events[b].other].p);

        let area1 = signed_area3(ap, ao, bp);
        let area2 = signed_area3(ap, ao, bo);
        if area1 != 0.0 || area2 != 0.0 {
            //segments are not collinear
            if ap == bp {
                //shared left endpoint: sort on the right endpoint
                return area2 > 0.0;
            }
            if self.compare_events(a, b) == Ordering::Less {
                //a was inserted before b: sort on b's position relative to a
                return match area1 != 0.0 {
                    true => area1 > 0.0,
                    false => area2 > 0.0,
                };
            }
            //b was inserted before a: sort on a's position relative to b
            let b_area1 = signed_area3(bp, bo, ap);
            let b_area2 = signed_area3(bp, bo, ao);
            return match b_area1 != 0.0 {
                true => b_area1 < 0.0,
                false => b_area2 < 0.0,
            };
        }
        //collinear segments
        if self.events[a].subject == self.events[b].subject {
            if ap == bp {
                return match self.events[a].contour_id.cmp(&self.events[b].contour_id) {
                    Ordering::Equal => a < b,
                    ord => ord == Ordering::Less,
                };
            }
        } else {
            return self.events[a].subject;
        }
        self.compare_events(a, b) == Ordering::Less
    }

    fn queue_push(&mut self, e: usize) {
        //the queue is sorted in reverse processing order so the next event can be popped
        let pos = self
            .queue
            .partition_point(|&q| self.compare_events(q, e) == Ordering::Greater);
        self.queue.insert(pos, e);
    }

    /// Splits the segment of left event `e` at point `p` into two segments.
    fn divide_segment(&mut self, e: usize, p: Point) {
        let old_right = self.events[e].other;
        if self.events[e].p == p || self.events[old_right].p == p {
            warn!("attempted to divide a segment at one of its endpoints");
            return;
        }
        let subject = self.events[e].subject;
        let contour_id = self.events[e].contour_id;

        //right event of the lower half, paired with e
        let r = self.events.len();
        self.events.push(SweepEvent {
            p,
            left: false,
            other: e,
            subject,
            contour_id,
            edge_type: EdgeType::Normal,
            in_out: false,
            other_in_out: false,
            in_result: false,
        });
        //left event of the upper half, paired with the old right event
        let l = self.events.len();
        self.events.push(SweepEvent {
            p,
            left: true,
            other: old_right,
            subject,
            contour_id,
            edge_type: EdgeType::Normal,
            in_out: false,
            other_in_out: false,
            in_result: false,
        });

        //rounding guard: the new left event must not be processed after the old right event
        if self.compare_events(l, old_right) == Ordering::Greater {
            self.events[old_right].left = true;
            self.events[l].left = false;
        }

        self.events[old_right].other = l;
        self.events[e].other = r;

        self.queue_push(l);
        self.queue_push(r);
    }

    fn compute_fields(&mut self, e: usize, prev: Option<usize>, op: BoolOp) {
        match prev {
            None => {
                self.events[e].in_out = false;
                self.events[e].other_in_out = true;
            }
            Some(pv) => {
                let (in_out, other_in_out) = if self.events[e].subject == self.events[pv].subject {
                    (!self.events[pv].in_out, self.events[pv].other_in_out)
                } else {
                    let oio = match self.is_vertical(pv) {
                        true => !self.events[pv].in_out,
                        false => self.events[pv].in_out,
                    };
                    (!self.events[pv].other_in_out, oio)
                };
                self.events[e].in_out = in_out;
                self.events[e].other_in_out = other_in_out;
            }
        }
        self.events[e].in_result = self.in_result(e, op);
    }

    fn in_result(&self, e: usize, op: BoolOp) -> bool {
        let ev = &self.events[e];
        match ev.edge_type {
            EdgeType::Normal => match op {
                BoolOp::Intersection => !ev.other_in_out,
                BoolOp::Union => ev.other_in_out,
                BoolOp::Difference => ev.subject == ev.other_in_out,
            },
            EdgeType::SameTransition => op == BoolOp::Intersection || op == BoolOp::Union,
            EdgeType::DifferentTransition => op == BoolOp::Difference,
            EdgeType::NonContributing => false,
        }
    }

    /// Handles a possible intersection between the segments of left events `e1` and `e2`.
    /// Returns 2 when the segments overlap and share their left endpoint, in which case
    /// the caller must recompute the fields of both events.
    fn possible_intersection(&mut self, e1: usize, e2: usize) -> u8 {
        let (a1, a2) = (self.events[e1].p, self.events[self.events[e1].other].p);
        let (b1, b2) = (self.events[e2].p, self.events[self.events[e2].other].p);

        let inter = segment_intersection(a1, a2, b1, b2);

        match inter {
            SegInter::None => 0,
            SegInter::One(p) => {
                //intersections at a shared endpoint require no action
                if a1 == b1 || a2 == b2 {
                    return 0;
                }
                if a1 != p && a2 != p {
                    self.divide_segment(e1, p);
                }
                if b1 != p && b2 != p {
                    self.divide_segment(e2, p);
                }
                1
            }
            SegInter::Overlap => {
                if self.events[e1].subject == self.events[e2].subject {
                    //overlapping edges within one operand: the operand region is
                    //degenerate there, leave the parity transitions to sort it out
                    return 0;
                }

                let left_coincide = a1 == b1;
                let right_coincide = a2 == b2;

                //order the non-coinciding endpoints by processing order
                let mut ordered: Vec<usize> = vec![];
                if !left_coincide {
                    match self.compare_events(e1, e2) {
                        Ordering::Greater => ordered.extend([e2, e1]),
                        _ => ordered.extend([e1, e2]),
                    }
                }
                if !right_coincide {
                    let (r1, r2) = (self.events[e1].other, self.events[e2].other);
                    match self.compare_events(r1, r2) {
                        Ordering::Greater => ordered.extend([r2, r1]),
                        _ => ordered.extend([r1, r2]),
                    }
                }

                if left_coincide {
                    //both segments are equal or share their left endpoint
                    self.events[e2].edge_type = EdgeType::NonContributing;
                    self.events[e1].edge_type =
                        match self.events[e1].in_out == self.events[e2].in_out {
                            true => EdgeType::SameTransition,
                            false => EdgeType::DifferentTransition,
                        };
                    if !right_coincide {
                        //divide the longer segment at the shorter one's right endpoint
                        let longer_left = self.events[ordered[1]].other;
                        let at = self.events[ordered[0]].p;
                        self.divide_segment(longer_left, at);
                    }
                    return 2;
                }

                if right_coincide {
                    //segments share their right endpoint
                    let at = self.events[ordered[1]].p;
                    self.divide_segment(ordered[0], at);
                    return 3;
                }

                if ordered[0] != self.events[ordered[3]].other {
                    //partial overlap, neither segment fully contains the other
                    self.divide_segment(ordered[0], self.events[ordered[1]].p);
                    self.divide_segment(ordered[1], self.events[ordered[2]].p);
                    return 3;
                }

                //one segment fully contains the other
                self.divide_segment(ordered[0], self.events[ordered[1]].p);
                let outer_left = self.events[ordered[3]].other;
                self.divide_segment(outer_left, self.events[ordered[2]].p);
                3
            }
        }
    }
}

/// Runs the sweep and returns the segments that belong to the boundary of the result.
pub(super) fn compute_segments(
    subject: &[Vec<Point>],
    clipping: &[Vec<Point>],
    op: BoolOp,
) -> Vec<(Point, Point)> {
    let mut sweep = Sweep {
        events: Vec::new(),
        queue: Vec::new(),
    };

    let mut contour_id = 0;
    for (contours, is_subject) in [(subject, true), (clipping, false)] {
        for contour in contours {
            let n = contour.len();
            for i in 0..n {
                let p1 = contour[i];
                let p2 = contour[(i + 1) % n];
                if p1 == p2 {
                    continue;
                }
                let e1 = sweep.events.len();
                let e2 = e1 + 1;
                let p1_first = p1.0 < p2.0 || (p1.0 == p2.0 && p1.1 < p2.1);
                sweep.events.push(SweepEvent {
                    p: p1,
                    left: p1_first,
                    other: e2,
                    subject: is_subject,
                    contour_id,
                    edge_type: EdgeType::Normal,
                    in_out: false,
                    other_in_out: false,
                    in_result: false,
                });
                sweep.events.push(SweepEvent {
                    p: p2,
                    left: !p1_first,
                    other: e1,
                    subject: is_subject,
                    contour_id,
                    edge_type: EdgeType::Normal,
                    in_out: false,
                    other_in_out: false,
                    in_result: false,
                });
            }
            contour_id += 1;
        }
    }

    sweep.queue = (0..sweep.events.len()).collect();
    //reverse processing order: the next event to process sits at the back
    let mut queue = std::mem::take(&mut sweep.queue);
    queue.sort_by(|&a, &b| sweep.compare_events(b, a));
    sweep.queue = queue;

    //status line: active left events ordered bottom to top
    let mut sl: Vec<usize> = Vec::new();

    while let Some(ei) = sweep.queue.pop() {
        if sweep.events[ei].left {
            let pos = sl.partition_point(|&s| sweep.segment_below(s, ei));
            sl.insert(pos, ei);
            let prev = pos.checked_sub(1).map(|i| sl[i]);
            let next = sl.get(pos + 1).copied();

            sweep.compute_fields(ei, prev, op);

            if let Some(nx) = next
                && sweep.possible_intersection(ei, nx) == 2
            {
                sweep.compute_fields(ei, prev, op);
                sweep.compute_fields(nx, Some(ei), op);
            }
            if let Some(pv) = prev
                && sweep.possible_intersection(pv, ei) == 2
            {
                let pv_pos = sl.iter().position(|&s| s == pv).expect("prev not in status line");
                let pv_prev = pv_pos.checked_sub(1).map(|i| sl[i]);
                sweep.compute_fields(pv, pv_prev, op);
                sweep.compute_fields(ei, Some(pv), op);
            }
        } else {
            let le = sweep.events[ei].other;
            if let Some(pos) = sl.iter().position(|&s| s == le) {
                let prev = pos.checked_sub(1).map(|i| sl[i]);
                let next = sl.get(pos + 1).copied();
                sl.remove(pos);
                if let (Some(pv), Some(nx)) = (prev, next) {
                    sweep.possible_intersection(pv, nx);
                }
            }
        }
    }

    sweep
        .events
        .iter()
        .filter(|e| e.left && e.in_result)
        .map(|e| (e.p, sweep.events[e.other].p))
        .collect()
}

enum SegInter {
    None,
    One(Point),
    Overlap,
}

/// Intersection of segments [a1, a2] and [b1, b2]. Intersection points that coincide
/// with an endpoint are snapped to that endpoint so coincident vertices stay
/// bit-identical across subdivisions.
fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> SegInter {
    let va = Point(a2.0 - a1.0, a2.1 - a1.1);
    let vb = Point(b2.0 - b1.0, b2.1 - b1.1);
    let e = Point(b1.0 - a1.0, b1.1 - a1.1);

    let kross = va.0 * vb.1 - va.1 * vb.0;
    if kross != 0.0 {
        let s = (e.0 * vb.1 - e.1 * vb.0) / kross;
        if !(0.0..=1.0).contains(&s) {
            return SegInter::None;
        }
        let t = (e.0 * va.1 - e.1 * va.0) / kross;
        if !(0.0..=1.0).contains(&t) {
            return SegInter::None;
        }
        let p = if s == 0.0 {
            a1
        } else if s == 1.0 {
            a2
        } else if t == 0.0 {
            b1
        } else if t == 1.0 {
            b2
        } else {
            Point(a1.0 + s * va.0, a1.1 + s * va.1)
        };
        return SegInter::One(p);
    }

    //parallel segments
    if e.0 * va.1 - e.1 * va.0 != 0.0 {
        return SegInter::None;
    }

    //collinear segments: project b's endpoints onto a
    let len_sq = va.0 * va.0 + va.1 * va.1;
    let s0 = (e.0 * va.0 + e.1 * va.1) / len_sq;
    let s1 = s0 + (vb.0 * va.0 + vb.1 * va.1) / len_sq;
    let (s_min, s_max) = (fsize::min(s0, s1), fsize::max(s0, s1));

    if s_max < 0.0 || s_min > 1.0 {
        return SegInter::None;
    }
    let lo = s_min.max(0.0);
    let hi = s_max.min(1.0);
    if lo == hi {
        //touching at a single point
        let p = collinear_param_point(lo, a1, a2, b1, b2, s0, s1, va);
        return SegInter::One(p);
    }
    SegInter::Overlap
}

fn collinear_param_point(
    s: fsize,
    a1: Point,
    a2: Point,
    b1: Point,
    b2: Point,
    s0: fsize,
    s1: fsize,
    va: Point,
) -> Point {
    if s == 0.0 {
        a1
    } else if s == 1.0 {
        a2
    } else if s == s0 {
        b1
    } else if s == s1 {
        b2
    } else {
        Point(a1.0 + s * va.0, a1.1 + s * va.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_intersection_crossing() {
        let p = segment_intersection(
            Point(0.0, 0.0),
            Point(2.0, 2.0),
            Point(0.0, 2.0),
            Point(2.0, 0.0),
        );
        match p {
            SegInter::One(p) => assert_eq!(p, Point(1.0, 1.0)),
            _ => panic!("expected a single intersection"),
        }
    }

    #[test]
    fn test_segment_intersection_endpoint_snap() {
        let p = segment_intersection(
            Point(0.0, 0.0),
            Point(2.0, 0.0),
            Point(1.0, 0.0),
            Point(1.0, 5.0),
        );
        match p {
            SegInter::One(p) => assert_eq!(p, Point(1.0, 0.0)),
            _ => panic!("expected a single intersection"),
        }
    }

    #[test]
    fn test_segment_intersection_collinear_overlap() {
        let p = segment_intersection(
            Point(0.0, 0.0),
            Point(2.0, 0.0),
            Point(1.0, 0.0),
            Point(3.0, 0.0),
        );
        assert!(matches!(p, SegInter::Overlap));
    }

    #[test]
    fn test_segment_intersection_disjoint() {
        let p = segment_intersection(
            Point(0.0, 0.0),
            Point(1.0, 0.0),
            Point(0.0, 1.0),
            Point(1.0, 1.0),
        );
        assert!(matches!(p, SegInter::None));
    }
}
