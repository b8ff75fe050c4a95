use anyhow::Result;
use anyhow::ensure;

use crate::fsize;
use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Point, Rect, Ring};

/// A polygon with holes: one outer [`Ring`] (positive orientation) plus zero or more
/// inner rings (negative orientation). Holes must lie strictly inside the outer ring
/// and be pairwise disjoint.
#[derive(Clone, Debug)]
pub struct Polygon {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    /// Creates a polygon from an outer ring and a set of holes.
    /// Orientations are normalized (outer positive, holes negative).
    pub fn try_new(outer: Ring, holes: Vec<Ring>) -> Result<Self> {
        let outer = outer.oriented(true);
        let holes: Vec<Ring> = holes.into_iter().map(|h| h.oriented(false)).collect();

        for hole in &holes {
            ensure!(
                outer.bbox.collides_with(&hole.bbox),
                "hole lies completely outside the outer ring"
            );
        }

        Ok(Polygon { outer, holes })
    }

    /// Creates a polygon without holes.
    pub fn simple(outer: Ring) -> Self {
        Polygon {
            outer: outer.oriented(true),
            holes: vec![],
        }
    }

    /// The vertex with respect to which translations of this polygon are expressed.
    pub fn reference_point(&self) -> Point {
        self.outer.points[0]
    }

    /// All rings of the polygon: the outer ring followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    pub fn translated(&self, dx: fsize, dy: fsize) -> Self {
        Polygon {
            outer: self.outer.translated(dx, dy),
            holes: self.holes.iter().map(|h| h.translated(dx, dy)).collect(),
        }
    }

    /// True if the point lies within the material of the polygon:
    /// inside the outer ring and outside every hole.
    pub fn contains(&self, point: &Point) -> bool {
        self.outer.collides_with(point) && !self.holes.iter().any(|h| h.collides_with(point))
    }
}

impl Shape for Polygon {
    fn centroid(&self) -> Point {
        self.outer.centroid()
    }

    fn area(&self) -> fsize {
        self.outer.area() - self.holes.iter().map(|h| h.area()).sum::<fsize>()
    }

    fn bbox(&self) -> Rect {
        self.outer.bbox
    }
}

impl Transformable for Polygon {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        let Polygon { outer, holes } = self;
        outer.transform(t);
        holes.iter_mut().for_each(|h| {
            h.transform(t);
        });
        self
    }
}

impl From<Rect> for Polygon {
    fn from(r: Rect) -> Self {
        Polygon::simple(Ring::try_new(r.corners().to_vec()).expect("rect corners form a ring"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_normalization() {
        let outer = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(0.0, 10.0),
            Point(10.0, 10.0),
            Point(10.0, 0.0),
        ])
        .unwrap(); //negative orientation
        let hole = Ring::try_new(vec![
            Point(2.0, 2.0),
            Point(8.0, 2.0),
            Point(8.0, 8.0),
            Point(2.0, 8.0),
        ])
        .unwrap(); //positive orientation

        let poly = Polygon::try_new(outer, vec![hole]).unwrap();
        assert!(poly.outer.is_positive());
        assert!(!poly.holes[0].is_positive());
        assert_eq!(poly.area(), 100.0 - 36.0);
    }

    #[test]
    fn test_contains() {
        let outer = Ring::try_new(vec![
            Point(0.0, 0.0),
            Point(10.0, 0.0),
            Point(10.0, 10.0),
            Point(0.0, 10.0),
        ])
        .unwrap();
        let hole = Ring::try_new(vec![
            Point(4.0, 4.0),
            Point(4.0, 6.0),
            Point(6.0, 6.0),
            Point(6.0, 4.0),
        ])
        .unwrap();
        let poly = Polygon::try_new(outer, vec![hole]).unwrap();

        assert!(poly.contains(&Point(1.0, 1.0)));
        assert!(!poly.contains(&Point(5.0, 5.0))); //inside the hole
        assert!(!poly.contains(&Point(11.0, 5.0)));
    }
}
