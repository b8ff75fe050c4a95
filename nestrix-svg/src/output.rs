//! Emission of the per-sheet result documents.

use anyhow::Result;
use svg::Document;
use svg::node::element::Path;

use nestrix::entities::{Part, Placement};
use nestrix::geometry::normalize_rotation;

use crate::ingest::{self, SourceElement};

/// Builds the output document for one sheet: a blank canvas with the sheet's view box,
/// holding the placed shapes with their retained attributes and placement transforms.
///
/// Each shape carries `translate(tx,ty) rotate(r,px,py)` where `(px,py)` is the part's
/// reference vertex in its canonical pose: the rotation spins the part in place about
/// that vertex, and the translation moves the vertex to its placed position.
pub fn sheet_document(
    sheet_doc: &str,
    placements: &[Placement],
    parts: &[Part],
    elements: &[SourceElement],
) -> Result<String> {
    let (min_x, min_y, width, height) = ingest::view_box(sheet_doc)?;
    let mut document = Document::new().set("viewBox", (min_x, min_y, width, height));

    for placement in placements {
        let part = &parts[placement.part_id];
        let element = &elements[placement.part_id];

        let p = part.reference_point();
        let (tx, ty) = placement.d_transf.translation();
        let rotation_deg = normalize_rotation(placement.d_transf.rotation()).to_degrees();
        let transform = format!(
            "translate({:.3},{:.3}) rotate({:.3},{:.3},{:.3})",
            tx - p.0,
            ty - p.1,
            rotation_deg,
            p.0,
            p.1
        );

        let mut path = Path::new().set("d", element.path_data.clone());
        for (key, value) in &element.attrs {
            path = path.set(key.as_str(), value.clone());
        }
        path = path.set("transform", transform);
        document = document.add(path);
    }

    Ok(document.to_string())
}
