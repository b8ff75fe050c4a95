use anyhow::Result;
use anyhow::ensure;

use crate::fsize;
use crate::geometry::geo_traits::{CollidesWith, DistanceTo};
use crate::geometry::primitives::Point;

/// Line segment between two [`Point`]s
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
}

impl Edge {
    pub fn try_new(start: Point, end: Point) -> Result<Self> {
        ensure!(start != end, "degenerate edge, {start:?} == {end:?}");
        Ok(Edge { start, end })
    }

    /// Returns the point on the edge closest to the given point: the orthogonal
    /// projection onto the carrying line, clamped to the segment.
    pub fn closest_point_on_edge(&self, point: &Point) -> Point {
        let Point(x0, y0) = self.start;
        let Point(x1, y1) = self.end;
        let (dx, dy) = (x1 - x0, y1 - y0);

        let sq_len = dx * dx + dy * dy;
        let t = match sq_len > 0.0 {
            true => (((point.0 - x0) * dx + (point.1 - y0) * dy) / sq_len).clamp(0.0, 1.0),
            false => 0.0,
        };
        Point(x0 + t * dx, y0 + t * dy)
    }

    pub fn x_min(&self) -> fsize {
        fsize::min(self.start.0, self.end.0)
    }

    pub fn y_min(&self) -> fsize {
        fsize::min(self.start.1, self.end.1)
    }

    pub fn x_max(&self) -> fsize {
        fsize::max(self.start.0, self.end.0)
    }

    pub fn y_max(&self) -> fsize {
        fsize::max(self.start.1, self.end.1)
    }

    pub fn length(&self) -> fsize {
        self.start.distance_to(&self.end)
    }

    pub fn centroid(&self) -> Point {
        Point(
            (self.start.0 + self.end.0) / 2.0,
            (self.start.1 + self.end.1) / 2.0,
        )
    }

    /// True if `point` lies on the edge, assuming it already lies on the carrying line.
    fn spans(&self, point: Point) -> bool {
        point.0 >= self.x_min()
            && point.0 <= self.x_max()
            && point.1 >= self.y_min()
            && point.1 <= self.y_max()
    }
}

impl DistanceTo<Point> for Edge {
    #[inline(always)]
    fn distance_to(&self, point: &Point) -> fsize {
        self.sq_distance_to(point).sqrt()
    }

    #[inline(always)]
    fn sq_distance_to(&self, point: &Point) -> fsize {
        self.closest_point_on_edge(point).sq_distance_to(point)
    }
}

/// Which side of the directed line a → b the point p falls on
/// (positive left, negative right, zero on the line).
#[inline(always)]
fn side(a: Point, b: Point, p: Point) -> fsize {
    (b.0 - a.0) * (p.1 - a.1) - (p.0 - a.0) * (b.1 - a.1)
}

impl CollidesWith<Edge> for Edge {
    #[inline(always)]
    fn collides_with(&self, other: &Edge) -> bool {
        if fsize::max(self.x_min(), other.x_min()) > fsize::min(self.x_max(), other.x_max())
            || fsize::max(self.y_min(), other.y_min()) > fsize::min(self.y_max(), other.y_max())
        {
            //bounding boxes do not overlap
            return false;
        }

        //two segments intersect iff each one straddles the line carrying the other
        let s1 = side(other.start, other.end, self.start);
        let s2 = side(other.start, other.end, self.end);
        let s3 = side(self.start, self.end, other.start);
        let s4 = side(self.start, self.end, other.end);

        if ((s1 > 0.0) != (s2 > 0.0) && (s1 < 0.0) != (s2 < 0.0))
            && ((s3 > 0.0) != (s4 > 0.0) && (s3 < 0.0) != (s4 < 0.0))
        {
            return true;
        }

        //endpoint lying exactly on the other segment
        (s1 == 0.0 && other.spans(self.start))
            || (s2 == 0.0 && other.spans(self.end))
            || (s3 == 0.0 && self.spans(other.start))
            || (s4 == 0.0 && self.spans(other.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_closest_point() {
        let edge = Edge {
            start: Point(0.0, 0.0),
            end: Point(10.0, 0.0),
        };
        assert_eq!(edge.closest_point_on_edge(&Point(4.0, 3.0)), Point(4.0, 0.0));
        //beyond the endpoints the projection clamps
        assert_eq!(edge.closest_point_on_edge(&Point(-5.0, 1.0)), Point(0.0, 0.0));
        assert_eq!(edge.closest_point_on_edge(&Point(12.0, -2.0)), Point(10.0, 0.0));
        assert_approx_eq!(fsize, edge.distance_to(&Point(4.0, 3.0)), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_edge_collision() {
        let e = |x0: fsize, y0: fsize, x1: fsize, y1: fsize| Edge {
            start: Point(x0, y0),
            end: Point(x1, y1),
        };

        //proper crossing
        assert!(e(0.0, 0.0, 2.0, 2.0).collides_with(&e(0.0, 2.0, 2.0, 0.0)));
        //touching at an endpoint
        assert!(e(0.0, 0.0, 2.0, 0.0).collides_with(&e(1.0, 0.0, 1.0, 5.0)));
        //disjoint parallels
        assert!(!e(0.0, 0.0, 2.0, 0.0).collides_with(&e(0.0, 1.0, 2.0, 1.0)));
        //collinear but apart
        assert!(!e(0.0, 0.0, 1.0, 0.0).collides_with(&e(2.0, 0.0, 3.0, 0.0)));
    }
}
