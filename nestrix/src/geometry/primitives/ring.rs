use anyhow::Result;
use anyhow::ensure;

use crate::fsize;
use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Edge, Point, Rect};
use crate::util::fpa::FPA;

/// A simple closed polyline: an ordered sequence of at least three distinct vertices,
/// with the closing edge implicit (no duplicated final vertex).
///
/// Orientation is a property of the ring and is preserved: a positive signed area
/// (counterclockwise) marks an outer boundary, a negative signed area marks a hole.
#[derive(Clone, Debug)]
pub struct Ring {
    /// Vertices of the ring, closing edge implicit
    pub points: Vec<Point>,
    /// Bounding box
    pub bbox: Rect,
    /// Signed shoelace area: positive for counterclockwise rings
    pub signed_area: fsize,
}

impl Ring {
    /// Creates a new ring from a set of points. Consecutive duplicates (including a
    /// duplicated closing vertex) are filtered out beforehand.
    pub fn try_new(points: Vec<Point>) -> Result<Self> {
        let points = strip_consecutive_duplicates(points);
        ensure!(points.len() >= 3, "ring must have at least 3 distinct points");

        let signed_area = Ring::calculate_area(&points);
        ensure!(signed_area != 0.0, "ring has no area: {points:?}");

        let bbox = Ring::generate_bbox(&points);

        Ok(Ring {
            points,
            bbox,
            signed_area,
        })
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn get_point(&self, i: usize) -> Point {
        self.points[i]
    }

    pub fn get_edge(&self, i: usize) -> Edge {
        let j = (i + 1) % self.n_points();
        Edge {
            start: self.points[i],
            end: self.points[j],
        }
    }

    pub fn edge_iter(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.n_points()).map(move |i| self.get_edge(i))
    }

    /// True if the ring is counterclockwise (positive signed area)
    pub fn is_positive(&self) -> bool {
        self.signed_area > 0.0
    }

    /// Returns `self` with its orientation inverted.
    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self.signed_area = -self.signed_area;
        self
    }

    /// Returns `self` in the requested orientation.
    pub fn oriented(self, positive: bool) -> Self {
        if self.is_positive() == positive {
            self
        } else {
            self.reversed()
        }
    }

    /// Returns `self` translated by `(dx, dy)`.
    pub fn translated(&self, dx: fsize, dy: fsize) -> Self {
        let points = self.points.iter().map(|p| Point(p.0 + dx, p.1 + dy)).collect();
        Ring {
            points,
            bbox: Rect {
                x_min: self.bbox.x_min + dx,
                y_min: self.bbox.y_min + dy,
                x_max: self.bbox.x_max + dx,
                y_max: self.bbox.y_max + dy,
            },
            signed_area: self.signed_area,
        }
    }

    /// Returns `self` point-reflected through the origin. A reflection through the
    /// origin is a rotation by 180°, so orientation is preserved.
    pub fn reflected(&self) -> Self {
        let points: Vec<Point> = self.points.iter().map(|p| Point(-p.0, -p.1)).collect();
        let bbox = Ring::generate_bbox(&points);
        Ring {
            points,
            bbox,
            signed_area: self.signed_area,
        }
    }

    //https://en.wikipedia.org/wiki/Shoelace_formula
    //counterclockwise = positive area, clockwise = negative area
    pub fn calculate_area(points: &[Point]) -> fsize {
        let mut sigma: fsize = 0.0;
        for i in 0..points.len() {
            let j = (i + 1) % points.len();
            let (x_i, y_i) = points[i].into();
            let (x_j, y_j) = points[j].into();
            sigma += (y_i + y_j) * (x_i - x_j);
        }
        0.5 * sigma
    }

    pub fn generate_bbox(points: &[Point]) -> Rect {
        let (mut x_min, mut y_min) = (fsize::MAX, fsize::MAX);
        let (mut x_max, mut y_max) = (fsize::MIN, fsize::MIN);

        for point in points.iter() {
            x_min = x_min.min(point.0);
            y_min = y_min.min(point.1);
            x_max = x_max.max(point.0);
            y_max = y_max.max(point.1);
        }
        Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }
}

fn strip_consecutive_duplicates(points: Vec<Point>) -> Vec<Point> {
    let mut stripped: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if stripped.last() != Some(&p) {
            stripped.push(p);
        }
    }
    while stripped.len() > 1 && stripped.first() == stripped.last() {
        stripped.pop();
    }
    stripped
}

impl Shape for Ring {
    fn centroid(&self) -> Point {
        //based on: https://en.wikipedia.org/wiki/Centroid#Of_a_polygon
        let area = self.signed_area;
        let mut c_x = 0.0;
        let mut c_y = 0.0;

        for i in 0..self.n_points() {
            let j = (i + 1) % self.n_points();
            let Point(x_i, y_i) = self.get_point(i);
            let Point(x_j, y_j) = self.get_point(j);
            c_x += (x_i + x_j) * (x_i * y_j - x_j * y_i);
            c_y += (y_i + y_j) * (x_i * y_j - x_j * y_i);
        }

        c_x /= 6.0 * area;
        c_y /= 6.0 * area;

        (c_x, c_y).into()
    }

    fn area(&self) -> fsize {
        self.signed_area.abs()
    }

    fn bbox(&self) -> Rect {
        self.bbox
    }
}

impl Transformable for Ring {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        //rigid transformations preserve the (signed) area
        let Ring {
            points,
            bbox,
            signed_area: _,
        } = self;

        points.iter_mut().for_each(|p| {
            p.transform(t);
        });
        *bbox = Ring::generate_bbox(points);

        self
    }
}

impl CollidesWith<Point> for Ring {
    fn collides_with(&self, point: &Point) -> bool {
        //based on the ray casting algorithm: https://en.wikipedia.org/wiki/Point_in_polygon#Ray_casting_algorithm
        match self.bbox.collides_with(point) {
            false => false,
            true => {
                //horizontal ray shot to the right,
                //from the point to another point that is certainly outside the shape
                let point_outside = Point(self.bbox.x_max + self.bbox.width(), point.1);
                let ray = Edge {
                    start: *point,
                    end: point_outside,
                };

                let mut n_intersections = 0;
                for edge in self.edge_iter() {
                    //Check if the ray does not go through (or almost through) a vertex.
                    //This can result in funky behaviour, which could give incorrect results,
                    //therefore we handle this case explicitly
                    let (s_x, s_y) = (FPA(edge.start.0), FPA(edge.start.1));
                    let (e_x, e_y) = (FPA(edge.end.0), FPA(edge.end.1));
                    let (p_x, p_y) = (FPA(point.0), FPA(point.1));

                    if (s_y == p_y && s_x > p_x) || (e_y == p_y && e_x > p_x) {
                        //in this case the ray passes through (or dangerously close to) a vertex.
                        //We handle this case by only counting an intersection if the edge is below the ray
                        if s_y < p_y || e_y < p_y {
                            n_intersections += 1;
                        }
                    } else if ray.collides_with(&edge) {
                        n_intersections += 1;
                    }
                }

                n_intersections % 2 == 1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: fsize) -> Ring {
        Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(size, 0.0),
            Point(size, size),
            Point(0.0, size),
        ])
        .unwrap()
    }

    #[test]
    fn test_area_and_orientation() {
        let sq = square(2.0);
        assert_eq!(sq.signed_area, 4.0);
        assert!(sq.is_positive());

        let rev = sq.reversed();
        assert_eq!(rev.signed_area, -4.0);
        assert!(!rev.is_positive());
    }

    #[test]
    fn test_duplicate_stripping() {
        let ring = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(1.0, 0.0),
            Point(1.0, 0.0),
            Point(1.0, 1.0),
            Point(0.0, 1.0),
            Point(0.0, 0.0), //duplicated closing vertex
        ])
        .unwrap();
        assert_eq!(ring.n_points(), 4);
    }

    #[test]
    fn test_degenerate_rejected() {
        assert!(Ring::try_new(vec![Point(0.0, 0.0), Point(1.0, 1.0)]).is_err());
        assert!(
            Ring::try_new(vec![Point(0.0, 0.0), Point(1.0, 1.0), Point(2.0, 2.0)]).is_err(),
            "collinear ring has no area"
        );
    }

    #[test]
    fn test_point_in_ring() {
        let sq = square(10.0);
        assert!(sq.collides_with(&Point(5.0, 5.0)));
        assert!(sq.collides_with(&Point(0.1, 9.9)));
        assert!(!sq.collides_with(&Point(10.5, 5.0)));
        assert!(!sq.collides_with(&Point(-0.1, 5.0)));

        //orientation must not matter for containment
        let rev = square(10.0).reversed();
        assert!(rev.collides_with(&Point(5.0, 5.0)));
    }
}
