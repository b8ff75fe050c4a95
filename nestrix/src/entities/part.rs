use crate::fsize;
use crate::geometry::Transformation;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::primitives::{Point, Polygon};
use crate::nfp::{ShapeId, shape_fingerprint};

/// A part to be placed: a polygon (possibly with holes) in its canonical pose, as
/// produced by ingest. The reference point is the first vertex of the outer boundary;
/// all placements are expressed as positions of that vertex.
#[derive(Clone, Debug)]
pub struct Part {
    /// Stable integer id assigned by the ingest stage
    pub id: usize,
    /// Canonical pose of the part, already conservatively dilated
    pub shape: Polygon,
    /// Translation-invariant identity, used by the NFP cache
    pub fingerprint: ShapeId,
}

impl Part {
    pub fn new(id: usize, shape: Polygon) -> Self {
        let fingerprint = shape_fingerprint(&shape);
        Part {
            id,
            shape,
            fingerprint,
        }
    }

    pub fn reference_point(&self) -> Point {
        self.shape.reference_point()
    }

    /// The part under the given rotation, normalized for the NFP engine: rotated about
    /// the reference vertex and translated so that vertex lies at the origin.
    pub fn pose(&self, rotation: fsize) -> PartPose {
        let r = self.reference_point();
        let t = Transformation::empty()
            .translate((-r.0, -r.1))
            .rotate(rotation);
        let mut shape = self.shape.clone();
        shape.transform(&t);
        let shape_id = shape_fingerprint(&shape);
        PartPose {
            shape,
            rotation,
            shape_id,
        }
    }
}

/// A part in a normalized rotated pose: reference vertex at the origin.
#[derive(Clone, Debug)]
pub struct PartPose {
    pub shape: Polygon,
    /// Rotation applied to the canonical pose, in radians
    pub rotation: fsize,
    /// Identity of this rotated pose, used when the pose becomes a stationary obstacle
    pub shape_id: ShapeId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::Ring;
    use float_cmp::assert_approx_eq;
    use std::f64::consts::PI;

    fn part() -> Part {
        Part::new(
            0,
            Polygon::simple(
                Ring::try_new(vec![
                    Point(5.0, 5.0),
                    Point(7.0, 5.0),
                    Point(7.0, 6.0),
                    Point(5.0, 6.0),
                ])
                .unwrap(),
            ),
        )
    }

    #[test]
    fn test_pose_reference_at_origin() {
        let pose = part().pose(0.0);
        assert_eq!(pose.shape.reference_point(), Point(0.0, 0.0));
        assert_approx_eq!(fsize, pose.shape.outer.bbox.x_max, 2.0, epsilon = 1e-9);
        assert_eq!(pose.shape_id, part().fingerprint);
    }

    #[test]
    fn test_pose_rotation_about_reference() {
        let pose = part().pose(PI / 2.0);
        let refp = pose.shape.reference_point();
        assert_approx_eq!(fsize, refp.0, 0.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, refp.1, 0.0, epsilon = 1e-9);
        //the 2x1 rectangle becomes 1x2 after a quarter turn
        let bbox = pose.shape.outer.bbox;
        assert_approx_eq!(fsize, bbox.width(), 1.0, epsilon = 1e-9);
        assert_approx_eq!(fsize, bbox.height(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_distinct_rotations_distinct_ids() {
        let p = part();
        assert_ne!(p.pose(0.0).shape_id, p.pose(PI / 2.0).shape_id);
    }
}
