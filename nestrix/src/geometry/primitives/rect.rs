use anyhow::Result;
use anyhow::ensure;

use crate::fsize;
use crate::geometry::geo_traits::CollidesWith;
use crate::geometry::primitives::Point;

/// Axis-aligned rectangle
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: fsize,
    pub y_min: fsize,
    pub x_max: fsize,
    pub y_max: fsize,
}

impl Rect {
    pub fn try_new(x_min: fsize, y_min: fsize, x_max: fsize, y_max: fsize) -> Result<Self> {
        ensure!(
            x_min < x_max && y_min < y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    pub fn width(&self) -> fsize {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> fsize {
        self.y_max - self.y_min
    }

    pub fn area(&self) -> fsize {
        self.width() * self.height()
    }

    pub fn centroid(&self) -> Point {
        Point(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn diameter(&self) -> fsize {
        (self.width().powi(2) + self.height().powi(2)).sqrt()
    }

    /// Returns the four corners of `self` in counterclockwise order, starting bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point(self.x_min, self.y_min),
            Point(self.x_max, self.y_min),
            Point(self.x_max, self.y_max),
            Point(self.x_min, self.y_max),
        ]
    }

    /// Returns a new rectangle with the same centroid as `self` but expanded by `dx` in both
    /// x-directions and by `dy` in both y-directions, or `None` if the result would be invalid.
    pub fn resize_by(mut self, dx: fsize, dy: fsize) -> Option<Self> {
        self.x_min -= dx;
        self.y_min -= dy;
        self.x_max += dx;
        self.y_max += dy;

        if self.x_min < self.x_max && self.y_min < self.y_max {
            Some(self)
        } else {
            None
        }
    }

    /// Returns the largest rectangle that is contained in both `a` and `b`.
    pub fn intersection(a: Rect, b: Rect) -> Option<Rect> {
        let x_min = fsize::max(a.x_min, b.x_min);
        let y_min = fsize::max(a.y_min, b.y_min);
        let x_max = fsize::min(a.x_max, b.x_max);
        let y_max = fsize::min(a.y_max, b.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Rect {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }

    /// Returns the smallest rectangle that contains both `a` and `b`.
    pub fn bounding_rect(a: Rect, b: Rect) -> Rect {
        Rect {
            x_min: fsize::min(a.x_min, b.x_min),
            y_min: fsize::min(a.y_min, b.y_min),
            x_max: fsize::max(a.x_max, b.x_max),
            y_max: fsize::max(a.y_max, b.y_max),
        }
    }

    /// True if `other` lies entirely within `self`, with a slack of `eps` on every side.
    pub fn contains_rect(&self, other: &Rect, eps: fsize) -> bool {
        self.x_min - eps <= other.x_min
            && self.y_min - eps <= other.y_min
            && self.x_max + eps >= other.x_max
            && self.y_max + eps >= other.y_max
    }
}

impl CollidesWith<Rect> for Rect {
    #[inline(always)]
    fn collides_with(&self, other: &Rect) -> bool {
        fsize::max(self.x_min, other.x_min) <= fsize::min(self.x_max, other.x_max)
            && fsize::max(self.y_min, other.y_min) <= fsize::min(self.y_max, other.y_max)
    }
}

impl CollidesWith<Point> for Rect {
    #[inline(always)]
    fn collides_with(&self, point: &Point) -> bool {
        let Point(x, y) = *point;
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}
