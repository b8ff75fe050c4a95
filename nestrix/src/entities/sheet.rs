use anyhow::Result;
use slotmap::SlotMap;

use crate::entities::PartPose;
use crate::fsize;
use crate::geometry::primitives::{Point, Polygon, Rect, Ring};
use crate::nfp::{ShapeId, shape_fingerprint};

slotmap::new_key_type! {
    /// Unique key of an [`Obstacle`] within a [`Sheet`]
    pub struct ObstacleKey;
}

/// A stationary obstacle on a sheet: a forbidden region from the sheet input or a part
/// that has already been placed. Held in normalized pose (reference vertex at the
/// origin) plus the absolute position of that vertex, so its NFPs can be cached
/// position-independently and translated into place.
#[derive(Clone, Debug)]
pub struct Obstacle {
    /// Shape with its reference vertex at the origin
    pub shape: Polygon,
    /// Absolute position of the reference vertex on the sheet
    pub position: Point,
    /// Identity of the normalized shape, used by the NFP cache
    pub shape_id: ShapeId,
}

/// An axis-aligned rectangular sheet plus its growing set of obstacles. Placed parts
/// are appended as obstacles; their internal holes remain free space for later parts.
#[derive(Clone)]
pub struct Sheet {
    pub rect: Rect,
    obstacles: SlotMap<ObstacleKey, Obstacle>,
}

impl Sheet {
    pub fn new(width: fsize, height: fsize) -> Result<Self> {
        Ok(Sheet {
            rect: Rect::try_new(0.0, 0.0, width, height)?,
            obstacles: SlotMap::with_key(),
        })
    }

    pub fn from_rect(rect: Rect) -> Self {
        Sheet {
            rect,
            obstacles: SlotMap::with_key(),
        }
    }

    /// Registers a forbidden region of the sheet, given by its boundary.
    pub fn add_hole(&mut self, boundary: Ring) -> ObstacleKey {
        self.add_obstacle(Polygon::simple(boundary))
    }

    /// Registers an arbitrary polygon (in sheet coordinates) as an obstacle.
    pub fn add_obstacle(&mut self, shape: Polygon) -> ObstacleKey {
        let refp = shape.reference_point();
        let normalized = shape.translated(-refp.0, -refp.1);
        let shape_id = shape_fingerprint(&normalized);
        self.obstacles.insert(Obstacle {
            shape: normalized,
            position: refp,
            shape_id,
        })
    }

    /// Registers a placed part pose at the given reference-vertex position.
    pub fn add_placed(&mut self, pose: &PartPose, position: Point) -> ObstacleKey {
        self.obstacles.insert(Obstacle {
            shape: pose.shape.clone(),
            position,
            shape_id: pose.shape_id,
        })
    }

    /// Obstacles in insertion order (the obstacle set is append-only).
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    pub fn n_obstacles(&self) -> usize {
        self.obstacles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obstacle_normalization() {
        let mut sheet = Sheet::new(100.0, 100.0).unwrap();
        let ring = Ring::try_new(vec![
            Point(10.0, 20.0),
            Point(15.0, 20.0),
            Point(15.0, 25.0),
            Point(10.0, 25.0),
        ])
        .unwrap();
        sheet.add_hole(ring);

        let obstacle = sheet.obstacles().next().unwrap();
        assert_eq!(obstacle.position, Point(10.0, 20.0));
        assert_eq!(obstacle.shape.reference_point(), Point(0.0, 0.0));
    }

    #[test]
    fn test_identical_holes_share_shape_id() {
        let mut sheet = Sheet::new(100.0, 100.0).unwrap();
        let square = |x: fsize, y: fsize| {
            Ring::try_new(vec![
                Point(x, y),
                Point(x + 5.0, y),
                Point(x + 5.0, y + 5.0),
                Point(x, y + 5.0),
            ])
            .unwrap()
        };
        sheet.add_hole(square(0.0, 0.0));
        sheet.add_hole(square(50.0, 70.0));

        let ids: Vec<ShapeId> = sheet.obstacles().map(|o| o.shape_id).collect();
        assert_eq!(ids[0], ids[1]);
    }
}
