use std::hash::{Hash, Hasher};

use crate::fsize;
use crate::geometry::Transformation;
use crate::geometry::geo_traits::{DistanceTo, Transformable};

/// Point(x, y)
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Point(pub fsize, pub fsize);

impl Point {
    pub fn x(&self) -> fsize {
        self.0
    }

    pub fn y(&self) -> fsize {
        self.1
    }
}

impl Transformable for Point {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        let m = t.matrix();
        let Point(x, y) = *self;
        self.0 = m[0][0].into_inner() * x + m[0][1].into_inner() * y + m[0][2].into_inner();
        self.1 = m[1][0].into_inner() * x + m[1][1].into_inner() * y + m[1][2].into_inner();
        self
    }
}

impl DistanceTo<Point> for Point {
    #[inline(always)]
    fn distance_to(&self, other: &Point) -> fsize {
        self.sq_distance_to(other).sqrt()
    }

    #[inline(always)]
    fn sq_distance_to(&self, other: &Point) -> fsize {
        (self.0 - other.0).powi(2) + (self.1 - other.1).powi(2)
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
        self.1.to_bits().hash(state);
    }
}

impl From<Point> for (fsize, fsize) {
    fn from(p: Point) -> Self {
        (p.0, p.1)
    }
}

impl From<(fsize, fsize)> for Point {
    fn from((x, y): (fsize, fsize)) -> Self {
        Point(x, y)
    }
}
