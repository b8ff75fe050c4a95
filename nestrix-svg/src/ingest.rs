//! Document ingest: converts the closed shapes of an SVG document into conservative
//! polygonal parts, and sheet documents into sheets with forbidden regions.
//!
//! The approximation contract: each subpath is sampled uniformly by arc length at
//! spacing `tolerance`, so the sampled polyline deviates from the true outline by at
//! most `tolerance / 2`. The boundary is then dilated by `1.5 × tolerance` and
//! simplified at `tolerance`, which guarantees the polygon contains the true shape and
//! over-approximates it by at most `3 × tolerance`. Holes are eroded by the same amount
//! so they are contained in the true holes. The part `offset` is applied as a final
//! dilation of the boundary only.

use anyhow::{Context, Result, ensure};
use log::{debug, warn};
use svg::parser::Event;

use nestrix::entities::{Part, Sheet};
use nestrix::fsize;
use nestrix::geometry::geo_traits::{DistanceTo, Shape};
use nestrix::geometry::primitives::{Polygon, Rect, Ring};
use nestrix::offset::{ShapeModifyMode, offset_ring, simplify_ring};

use crate::path_data::{self, Subpath};
use crate::shapes::SvgShape;

/// Presentation and identification attributes that are preserved on ingest and written
/// back onto the placed shapes, so the output looks like (and can be matched with) the
/// input.
pub const RETAINED_ATTRS: &[&str] = &[
    "alignment-baseline",
    "baseline-shift",
    "clip",
    "clip-path",
    "clip-rule",
    "color",
    "color-interpolation",
    "color-interpolation-filters",
    "color-profile",
    "color-rendering",
    "direction",
    "display",
    "dominant-baseline",
    "enable-background",
    "fill",
    "fill-opacity",
    "fill-rule",
    "filter",
    "flood-color",
    "flood-opacity",
    "lighting-color",
    "marker-end",
    "marker-mid",
    "marker-start",
    "mask",
    "opacity",
    "overflow",
    "shape-rendering",
    "stop-color",
    "stop-opacity",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "vector-effect",
    "visibility",
    "class",
    "id",
    "name",
];

/// The opaque source of one ingested part, for round-tripping into the output.
#[derive(Clone, Debug)]
pub struct SourceElement {
    /// The element's geometry as canonical path data
    pub path_data: String,
    /// Retained presentation attributes, in document order
    pub attrs: Vec<(String, String)>,
}

/// The result of ingesting a parts document: parts and their source elements, index-
/// aligned (part `id` indexes into `elements`).
#[derive(Clone, Debug, Default)]
pub struct Ingest {
    pub elements: Vec<SourceElement>,
    pub parts: Vec<Part>,
}

/// Reads the `viewBox` of a document: `(min_x, min_y, width, height)`.
/// A missing or malformed view box is an input error (the sheet size depends on it).
pub fn view_box(doc: &str) -> Result<(fsize, fsize, fsize, fsize)> {
    for event in svg::read(doc).context("document is not parseable SVG")? {
        if let Event::Tag("svg", _, attrs) = event
            && let Some(vb) = attrs.get("viewBox")
        {
            let values: Vec<fsize> = vb
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(|v| v.parse::<fsize>().context("malformed viewBox value"))
                .collect::<Result<_>>()?;
            ensure!(values.len() == 4, "viewBox must have four values");
            return Ok((values[0], values[1], values[2], values[3]));
        }
    }
    anyhow::bail!("document has no viewBox")
}

/// Extracts all closed shapes of the document as conservatively approximated parts.
///
/// Open paths and shapes that degenerate below three distinct points are dropped
/// silently; they are neither placed nor counted as failed.
pub fn extract_parts(doc: &str, tolerance: fsize, offset: fsize) -> Result<Ingest> {
    ensure!(tolerance > 0.0, "tolerance must be positive");
    ensure!(offset >= 0.0, "offset cannot be negative");
    view_box(doc)?; //the coordinate frame must be defined

    let mut ingest = Ingest::default();

    for event in svg::read(doc).context("document is not parseable SVG")? {
        let (name, attrs) = match event {
            Event::Tag(name, svg::node::element::tag::Type::Start, attrs)
            | Event::Tag(name, svg::node::element::tag::Type::Empty, attrs) => (name, attrs),
            _ => continue,
        };
        if attrs.get("visibility").is_some_and(|v| &**v == "hidden") {
            continue;
        }
        let shape = match SvgShape::from_tag(name, &attrs) {
            None => continue,
            Some(Err(e)) => {
                warn!("skipping malformed {name} element: {e}");
                continue;
            }
            Some(Ok(shape)) => shape,
        };

        let d = shape.to_path_data();
        let subpaths = match path_data::parse_subpaths(&d) {
            Ok(subs) if !subs.is_empty() => subs,
            Ok(_) => continue,
            Err(e) => {
                warn!("skipping element with unparseable path data: {e}");
                continue;
            }
        };

        let Some(polygon) = approximate_polygon(&subpaths, tolerance, offset) else {
            continue;
        };

        let attrs_kept = RETAINED_ATTRS
            .iter()
            .filter_map(|&key| attrs.get(key).map(|v| (key.to_string(), v.to_string())))
            .collect();

        let id = ingest.parts.len();
        ingest.parts.push(Part::new(id, polygon));
        ingest.elements.push(SourceElement {
            path_data: d,
            attrs: attrs_kept,
        });
    }

    debug!(
        "ingested {} part(s) at tolerance {tolerance}, offset {offset}",
        ingest.parts.len()
    );
    Ok(ingest)
}

/// Builds the conservative polygon of one shape: first subpath as dilated boundary,
/// remaining subpaths as eroded holes. Returns `None` when the shape is open or
/// degenerates.
fn approximate_polygon(subpaths: &[Subpath], tolerance: fsize, offset: fsize) -> Option<Polygon> {
    let boundary = discretize_closed(&subpaths[0], tolerance)?;

    //dilate to cover the discretization error, simplify within the gained slack
    let dilated = offset_ring(&boundary, ShapeModifyMode::Inflate, 1.5 * tolerance);
    let dil_outer = largest_outer(&dilated)?;
    let simplified = simplify_ring(&dil_outer, tolerance)?;

    //the user-requested clearance, on the boundary only
    let outer = match offset > 0.0 {
        true => largest_outer(&offset_ring(&simplified, ShapeModifyMode::Inflate, offset))?,
        false => simplified,
    };

    let mut holes = Vec::new();
    for subpath in &subpaths[1..] {
        let Some(hole) = discretize_closed(subpath, tolerance) else {
            continue; //open hole subpaths are ignored
        };
        //eroding may split a hole into components or make it vanish entirely
        for component in offset_ring(&hole, ShapeModifyMode::Deflate, 1.5 * tolerance) {
            if let Some(simplified) = simplify_ring(&component.outer, tolerance) {
                holes.push(simplified);
            }
        }
    }

    match Polygon::try_new(outer, holes) {
        Ok(polygon) => Some(polygon),
        Err(e) => {
            warn!("dropping shape with inconsistent rings: {e}");
            None
        }
    }
}

/// Discretizes a subpath at uniform arc-length spacing `tolerance`, provided it is
/// closed within `tolerance`.
fn discretize_closed(subpath: &Subpath, tolerance: fsize) -> Option<Ring> {
    let flattened = path_data::flatten_subpath(subpath, tolerance / 4.0);
    if flattened.len() < 2 {
        return None;
    }
    let closed = subpath.closed
        || flattened[0].distance_to(flattened.last().unwrap()) < tolerance;
    if !closed {
        return None;
    }
    let sampled = path_data::resample_closed(&flattened, tolerance);
    Ring::try_new(sampled).ok()
}

fn largest_outer(region: &[Polygon]) -> Option<Ring> {
    region
        .iter()
        .max_by(|a, b| {
            a.outer
                .area()
                .partial_cmp(&b.outer.area())
                .expect("area is NaN")
        })
        .map(|p| p.outer.clone())
}

/// Ingests a sheet document: the view box defines the sheet rectangle, contained closed
/// shapes become forbidden regions (their boundaries, run through the same conservative
/// pipeline as parts).
pub fn extract_sheet(doc: &str, tolerance: fsize, offset: fsize) -> Result<Sheet> {
    let (min_x, min_y, width, height) = view_box(doc)?;
    let rect = Rect::try_new(min_x, min_y, min_x + width, min_y + height)
        .context("sheet view box has no area")?;
    let mut sheet = Sheet::from_rect(rect);

    let ingested = extract_parts(doc, tolerance, offset)?;
    for part in ingested.parts {
        sheet.add_hole(part.shape.outer.clone());
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestrix::geometry::geo_traits::Shape;

    #[test]
    fn test_view_box() {
        let doc = r#"<svg viewBox="0 0 300 200"><rect width="10" height="10"/></svg>"#;
        assert_eq!(view_box(doc).unwrap(), (0.0, 0.0, 300.0, 200.0));
    }

    #[test]
    fn test_missing_view_box_is_error() {
        let doc = r#"<svg><rect width="10" height="10"/></svg>"#;
        assert!(view_box(doc).is_err());
        assert!(extract_parts(doc, 0.1, 0.0).is_err());
    }

    #[test]
    fn test_extract_rect_is_conservative() {
        let doc = r#"<svg viewBox="0 0 100 100"><rect x="10" y="10" width="20" height="10"/></svg>"#;
        let tolerance = 0.1;
        let ingest = extract_parts(doc, tolerance, 0.0).unwrap();
        assert_eq!(ingest.parts.len(), 1);

        let bbox = ingest.parts[0].shape.bbox();
        //contains the true shape...
        assert!(bbox.x_min <= 10.0 && bbox.x_max >= 30.0);
        assert!(bbox.y_min <= 10.0 && bbox.y_max >= 20.0);
        //...and over-approximates by at most 3*tolerance
        assert!(bbox.x_min >= 10.0 - 3.0 * tolerance);
        assert!(bbox.x_max <= 30.0 + 3.0 * tolerance);
    }

    #[test]
    fn test_offset_adds_clearance() {
        let doc = r#"<svg viewBox="0 0 100 100"><rect x="10" y="10" width="20" height="10"/></svg>"#;
        let ingest = extract_parts(doc, 0.1, 2.0).unwrap();
        let bbox = ingest.parts[0].shape.bbox();
        assert!(bbox.x_min <= 8.0 + 3.0 * 0.1);
        assert!(bbox.x_max >= 32.0 - 3.0 * 0.1);
    }

    #[test]
    fn test_hidden_elements_skipped() {
        let doc = r#"<svg viewBox="0 0 100 100">
            <rect width="10" height="10" visibility="hidden"/>
            <rect width="20" height="20"/>
        </svg>"#;
        let ingest = extract_parts(doc, 0.1, 0.0).unwrap();
        assert_eq!(ingest.parts.len(), 1);
    }

    #[test]
    fn test_open_paths_dropped() {
        let doc = r#"<svg viewBox="0 0 100 100"><path d="M 0,0 L 50,0 L 50,50"/></svg>"#;
        let ingest = extract_parts(doc, 0.1, 0.0).unwrap();
        assert!(ingest.parts.is_empty());
    }

    #[test]
    fn test_path_with_hole() {
        let doc = r#"<svg viewBox="0 0 100 100">
            <path d="M 0,0 L 50,0 L 50,50 L 0,50 Z M 10,10 L 40,10 L 40,40 L 10,40 Z"/>
        </svg>"#;
        let ingest = extract_parts(doc, 0.1, 0.0).unwrap();
        assert_eq!(ingest.parts.len(), 1);
        let part = &ingest.parts[0];
        assert_eq!(part.shape.holes.len(), 1);
        //hole is eroded: strictly inside the original 30x30 hole
        let hole_bbox = part.shape.holes[0].bbox;
        assert!(hole_bbox.x_min >= 10.0);
        assert!(hole_bbox.x_max <= 40.0);
    }

    #[test]
    fn test_attributes_retained() {
        let doc = r#"<svg viewBox="0 0 100 100"><rect width="10" height="10" fill="red" id="p1" data-unknown="x"/></svg>"#;
        let ingest = extract_parts(doc, 0.1, 0.0).unwrap();
        let attrs = &ingest.elements[0].attrs;
        assert!(attrs.contains(&("fill".to_string(), "red".to_string())));
        assert!(attrs.contains(&("id".to_string(), "p1".to_string())));
        assert!(!attrs.iter().any(|(k, _)| k == "data-unknown"));
    }

    #[test]
    fn test_extract_sheet_with_hole() {
        let doc = r#"<svg viewBox="0 0 300 300"><rect x="0" y="0" width="100" height="100"/></svg>"#;
        let sheet = extract_sheet(doc, 0.5, 1.0).unwrap();
        assert_eq!(sheet.rect.width(), 300.0);
        assert_eq!(sheet.n_obstacles(), 1);
    }

    #[test]
    fn test_empty_document_is_valid() {
        let doc = r#"<svg viewBox="0 0 10 10"></svg>"#;
        let ingest = extract_parts(doc, 0.1, 0.0).unwrap();
        assert!(ingest.parts.is_empty());
        assert!(ingest.elements.is_empty());
    }
}
