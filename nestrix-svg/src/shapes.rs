//! The closed set of SVG shape kinds supported by ingest, each with a conversion to
//! canonical path data.

use anyhow::{Context, Result};
use svg::node::Attributes;

/// Quarter-circle cubic Bézier handle length for a unit radius.
const KAPPA: f64 = 0.552_284_749_831;

/// A geometry-bearing SVG element.
#[derive(Clone, Debug, PartialEq)]
pub enum SvgShape {
    Path { d: String },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Polygon { points: Vec<(f64, f64)> },
    Polyline { points: Vec<(f64, f64)> },
}

impl SvgShape {
    /// Interprets a tag as a shape. Returns `None` for non-shape tags, and an error for
    /// a shape tag with missing or malformed attributes.
    pub fn from_tag(name: &str, attrs: &Attributes) -> Option<Result<SvgShape>> {
        let get = |key: &str| -> Option<f64> { attrs.get(key).and_then(|v| v.parse().ok()) };
        let get_or = |key: &str, default: f64| -> f64 { get(key).unwrap_or(default) };

        match name {
            "path" => Some(
                attrs
                    .get("d")
                    .map(|d| SvgShape::Path { d: d.to_string() })
                    .context("path element without d attribute"),
            ),
            "rect" => Some(match (get("width"), get("height")) {
                (Some(width), Some(height)) => Ok(SvgShape::Rect {
                    x: get_or("x", 0.0),
                    y: get_or("y", 0.0),
                    width,
                    height,
                }),
                _ => Err(anyhow::anyhow!("rect element without width/height")),
            }),
            "circle" => Some(match get("r") {
                Some(r) => Ok(SvgShape::Circle {
                    cx: get_or("cx", 0.0),
                    cy: get_or("cy", 0.0),
                    r,
                }),
                None => Err(anyhow::anyhow!("circle element without radius")),
            }),
            "ellipse" => Some(match (get("rx"), get("ry")) {
                (Some(rx), Some(ry)) => Ok(SvgShape::Ellipse {
                    cx: get_or("cx", 0.0),
                    cy: get_or("cy", 0.0),
                    rx,
                    ry,
                }),
                _ => Err(anyhow::anyhow!("ellipse element without radii")),
            }),
            "polygon" | "polyline" => Some(parse_point_list(attrs).map(|points| match name {
                "polygon" => SvgShape::Polygon { points },
                _ => SvgShape::Polyline { points },
            })),
            _ => None,
        }
    }

    /// The shape as canonical path data. Curved shapes become cubic Bézier arcs, so the
    /// downstream arc-length discretization bounds the approximation error.
    pub fn to_path_data(&self) -> String {
        match self {
            SvgShape::Path { d } => d.clone(),
            SvgShape::Rect {
                x,
                y,
                width,
                height,
            } => format!(
                "M {x},{y} L {},{y} L {},{} L {x},{} Z",
                x + width,
                x + width,
                y + height,
                y + height,
            ),
            SvgShape::Circle { cx, cy, r } => ellipse_path(*cx, *cy, *r, *r),
            SvgShape::Ellipse { cx, cy, rx, ry } => ellipse_path(*cx, *cy, *rx, *ry),
            SvgShape::Polygon { points } => {
                let mut d = point_list_path(points);
                d.push_str(" Z");
                d
            }
            SvgShape::Polyline { points } => point_list_path(points),
        }
    }
}

/// An ellipse as four cubic Bézier quarter-arcs, starting at the rightmost point.
fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> String {
    let (kx, ky) = (KAPPA * rx, KAPPA * ry);
    format!(
        "M {},{} \
         C {},{} {},{} {},{} \
         C {},{} {},{} {},{} \
         C {},{} {},{} {},{} \
         C {},{} {},{} {},{} Z",
        cx + rx, cy,
        cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry,
        cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy,
        cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry,
        cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy,
    )
}

fn point_list_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{}{} {},{}", if i == 0 { "" } else { " " }, cmd, x, y));
    }
    d
}

fn parse_point_list(attrs: &Attributes) -> Result<Vec<(f64, f64)>> {
    let raw = attrs
        .get("points")
        .context("polygon/polyline element without points attribute")?;
    let coords: Vec<f64> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().context("malformed coordinate in points"))
        .collect::<Result<_>>()?;
    anyhow::ensure!(coords.len() % 2 == 0, "odd number of coordinates in points");
    Ok(coords.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_path_data() {
        let shape = SvgShape::Rect {
            x: 1.0,
            y: 2.0,
            width: 10.0,
            height: 5.0,
        };
        assert_eq!(shape.to_path_data(), "M 1,2 L 11,2 L 11,7 L 1,7 Z");
    }

    #[test]
    fn test_polygon_path_data() {
        let shape = SvgShape::Polygon {
            points: vec![(0.0, 0.0), (4.0, 0.0), (2.0, 3.0)],
        };
        assert_eq!(shape.to_path_data(), "M 0,0 L 4,0 L 2,3 Z");
    }

    #[test]
    fn test_circle_path_closes() {
        let shape = SvgShape::Circle {
            cx: 5.0,
            cy: 5.0,
            r: 2.0,
        };
        let d = shape.to_path_data();
        assert!(d.starts_with("M 7,5"));
        assert!(d.ends_with('Z'));
        assert_eq!(d.matches('C').count(), 4);
    }
}
