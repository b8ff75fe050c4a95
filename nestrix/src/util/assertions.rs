//! Validation helpers used in `debug_assert!` checks and tests.

use crate::boolean;
use crate::entities::Sheet;
use crate::fsize;
use crate::geometry::geo_traits::{CollidesWith, Shape};
use crate::geometry::primitives::Polygon;

/// True if the placed shape's material is disjoint from every obstacle on the sheet
/// (touching boundaries are allowed; overlap areas below `eps` count as touching).
pub fn placement_is_disjoint(sheet: &Sheet, placed: &Polygon, eps: fsize) -> bool {
    let placed_region = [placed.clone()];
    sheet.obstacles().all(|obstacle| {
        let shape = obstacle.shape.translated(obstacle.position.0, obstacle.position.1);
        if !shape.bbox().collides_with(&placed.bbox()) {
            return true;
        }
        let overlap = boolean::intersection(&placed_region, &[shape]);
        boolean::region_area(&overlap) <= eps * (placed.bbox().diameter() + 1.0)
    })
}

/// True if the shape lies entirely within the sheet rectangle, with `eps` slack.
pub fn placement_within_sheet(sheet: &Sheet, placed: &Polygon, eps: fsize) -> bool {
    sheet.rect.contains_rect(&placed.bbox(), eps)
}
