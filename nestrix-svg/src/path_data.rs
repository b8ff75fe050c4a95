//! Path data parsing and discretization: subpath extraction, curve flattening and
//! uniform arc-length resampling.

use anyhow::{Result, anyhow, bail};
use svg::node::element::path::{Command, Data, Position};

use nestrix::fsize;
use nestrix::geometry::geo_traits::DistanceTo;
use nestrix::geometry::primitives::Point;

/// One subpath of an SVG path: a start point and a sequence of segments.
#[derive(Clone, Debug)]
pub struct Subpath {
    pub start: Point,
    pub segments: Vec<Segment>,
    /// True if the subpath was closed with a Z command
    pub closed: bool,
}

#[derive(Clone, Debug)]
pub enum Segment {
    Line(Point),
    Quadratic(Point, Point),
    Cubic(Point, Point, Point),
    Arc {
        rx: fsize,
        ry: fsize,
        /// Rotation of the ellipse axes in degrees
        x_rotation: fsize,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
}

impl Segment {
    fn endpoint(&self) -> Point {
        match self {
            Segment::Line(p) => *p,
            Segment::Quadratic(_, p) => *p,
            Segment::Cubic(_, _, p) => *p,
            Segment::Arc { to, .. } => *to,
        }
    }
}

/// Parses path data into its subpaths. The first subpath is the boundary of the shape;
/// subsequent subpaths are its holes.
pub fn parse_subpaths(d: &str) -> Result<Vec<Subpath>> {
    let data = Data::parse(d).map_err(|e| anyhow!("malformed path data: {e}"))?;

    let mut subpaths: Vec<Subpath> = Vec::new();
    let mut current: Option<Subpath> = None;
    let mut pos = Point(0.0, 0.0);
    let mut subpath_start = Point(0.0, 0.0);
    let mut prev_cubic_ctrl: Option<Point> = None;
    let mut prev_quad_ctrl: Option<Point> = None;

    let mut flush = |current: &mut Option<Subpath>, closed: bool| {
        if let Some(mut sub) = current.take() {
            sub.closed = closed;
            if !sub.segments.is_empty() {
                subpaths.push(sub);
            }
        }
    };

    for command in data.iter() {
        let mut new_cubic_ctrl = None;
        let mut new_quad_ctrl = None;

        match command {
            Command::Move(position, params) => {
                let params = chunked(params, 2)?;
                for (i, chunk) in params.iter().enumerate() {
                    let target = resolve(*position, pos, chunk[0], chunk[1]);
                    if i == 0 {
                        flush(&mut current, false);
                        pos = target;
                        subpath_start = target;
                        current = Some(Subpath {
                            start: target,
                            segments: vec![],
                            closed: false,
                        });
                    } else {
                        //additional coordinate pairs are implicit line-tos
                        push_segment(&mut current, subpath_start, Segment::Line(target));
                        pos = target;
                    }
                }
            }
            Command::Line(position, params) => {
                for chunk in chunked(params, 2)? {
                    let target = resolve(*position, pos, chunk[0], chunk[1]);
                    push_segment(&mut current, pos, Segment::Line(target));
                    pos = target;
                }
            }
            Command::HorizontalLine(position, params) => {
                for chunk in chunked(params, 1)? {
                    let x = match position {
                        Position::Absolute => chunk[0] as fsize,
                        Position::Relative => pos.0 + chunk[0] as fsize,
                    };
                    let target = Point(x, pos.1);
                    push_segment(&mut current, pos, Segment::Line(target));
                    pos = target;
                }
            }
            Command::VerticalLine(position, params) => {
                for chunk in chunked(params, 1)? {
                    let y = match position {
                        Position::Absolute => chunk[0] as fsize,
                        Position::Relative => pos.1 + chunk[0] as fsize,
                    };
                    let target = Point(pos.0, y);
                    push_segment(&mut current, pos, Segment::Line(target));
                    pos = target;
                }
            }
            Command::CubicCurve(position, params) => {
                for chunk in chunked(params, 6)? {
                    let c1 = resolve(*position, pos, chunk[0], chunk[1]);
                    let c2 = resolve(*position, pos, chunk[2], chunk[3]);
                    let target = resolve(*position, pos, chunk[4], chunk[5]);
                    push_segment(&mut current, pos, Segment::Cubic(c1, c2, target));
                    new_cubic_ctrl = Some(c2);
                    pos = target;
                }
            }
            Command::SmoothCubicCurve(position, params) => {
                for chunk in chunked(params, 4)? {
                    let c1 = reflect(prev_cubic_ctrl, pos);
                    let c2 = resolve(*position, pos, chunk[0], chunk[1]);
                    let target = resolve(*position, pos, chunk[2], chunk[3]);
                    push_segment(&mut current, pos, Segment::Cubic(c1, c2, target));
                    new_cubic_ctrl = Some(c2);
                    pos = target;
                }
            }
            Command::QuadraticCurve(position, params) => {
                for chunk in chunked(params, 4)? {
                    let c = resolve(*position, pos, chunk[0], chunk[1]);
                    let target = resolve(*position, pos, chunk[2], chunk[3]);
                    push_segment(&mut current, pos, Segment::Quadratic(c, target));
                    new_quad_ctrl = Some(c);
                    pos = target;
                }
            }
            Command::SmoothQuadraticCurve(position, params) => {
                for chunk in chunked(params, 2)? {
                    let c = reflect(prev_quad_ctrl, pos);
                    let target = resolve(*position, pos, chunk[0], chunk[1]);
                    push_segment(&mut current, pos, Segment::Quadratic(c, target));
                    new_quad_ctrl = Some(c);
                    pos = target;
                }
            }
            Command::EllipticalArc(position, params) => {
                for chunk in chunked(params, 7)? {
                    let target = resolve(*position, pos, chunk[5], chunk[6]);
                    push_segment(
                        &mut current,
                        pos,
                        Segment::Arc {
                            rx: chunk[0] as fsize,
                            ry: chunk[1] as fsize,
                            x_rotation: chunk[2] as fsize,
                            large_arc: chunk[3] != 0.0,
                            sweep: chunk[4] != 0.0,
                            to: target,
                        },
                    );
                    pos = target;
                }
            }
            Command::Close => {
                flush(&mut current, true);
                pos = subpath_start;
            }
        }

        prev_cubic_ctrl = new_cubic_ctrl;
        prev_quad_ctrl = new_quad_ctrl;
    }
    flush(&mut current, false);

    Ok(subpaths)
}

fn push_segment(current: &mut Option<Subpath>, start: Point, segment: Segment) {
    //segments after a Z without an intervening M continue in a fresh subpath
    current
        .get_or_insert_with(|| Subpath {
            start,
            segments: vec![],
            closed: false,
        })
        .segments
        .push(segment);
}

fn resolve(position: Position, current: Point, x: f32, y: f32) -> Point {
    match position {
        Position::Absolute => Point(x as fsize, y as fsize),
        Position::Relative => Point(current.0 + x as fsize, current.1 + y as fsize),
    }
}

fn reflect(ctrl: Option<Point>, about: Point) -> Point {
    match ctrl {
        Some(c) => Point(2.0 * about.0 - c.0, 2.0 * about.1 - c.1),
        None => about,
    }
}

fn chunked(params: &[f32], size: usize) -> Result<Vec<&[f32]>> {
    if params.is_empty() || params.len() % size != 0 {
        bail!(
            "expected parameter groups of {size}, got {} parameters",
            params.len()
        );
    }
    Ok(params.chunks(size).collect())
}

/// Flattens a subpath into a polyline. Curves are approximated with chords no longer
/// than roughly `curve_tol`.
pub fn flatten_subpath(sub: &Subpath, curve_tol: fsize) -> Vec<Point> {
    let mut points = vec![sub.start];
    let mut pos = sub.start;

    for segment in &sub.segments {
        match segment {
            Segment::Line(p) => points.push(*p),
            Segment::Quadratic(c, p) => {
                let steps = curve_steps(pos.distance_to(c) + c.distance_to(p), curve_tol);
                for i in 1..=steps {
                    let t = i as fsize / steps as fsize;
                    points.push(quadratic_point(pos, *c, *p, t));
                }
            }
            Segment::Cubic(c1, c2, p) => {
                let ctrl_len =
                    pos.distance_to(c1) + c1.distance_to(c2) + c2.distance_to(p);
                let steps = curve_steps(ctrl_len, curve_tol);
                for i in 1..=steps {
                    let t = i as fsize / steps as fsize;
                    points.push(cubic_point(pos, *c1, *c2, *p, t));
                }
            }
            Segment::Arc {
                rx,
                ry,
                x_rotation,
                large_arc,
                sweep,
                to,
            } => {
                flatten_arc(
                    &mut points,
                    pos,
                    *rx,
                    *ry,
                    *x_rotation,
                    *large_arc,
                    *sweep,
                    *to,
                    curve_tol,
                );
            }
        }
        pos = segment.endpoint();
    }

    points
}

fn curve_steps(ctrl_len: fsize, curve_tol: fsize) -> usize {
    ((ctrl_len / curve_tol.max(1e-9)).ceil() as usize).clamp(8, 512)
}

fn quadratic_point(p0: Point, c: Point, p1: Point, t: fsize) -> Point {
    let u = 1.0 - t;
    Point(
        u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0,
        u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1,
    )
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: fsize) -> Point {
    let u = 1.0 - t;
    Point(
        u * u * u * p0.0 + 3.0 * u * u * t * c1.0 + 3.0 * u * t * t * c2.0 + t * t * t * p1.0,
        u * u * u * p0.1 + 3.0 * u * u * t * c1.1 + 3.0 * u * t * t * c2.1 + t * t * t * p1.1,
    )
}

/// Flattens an elliptical arc by converting the SVG endpoint parameterization to the
/// center parameterization (SVG spec appendix F.6.5) and sampling by angle.
#[allow(clippy::too_many_arguments)]
fn flatten_arc(
    points: &mut Vec<Point>,
    from: Point,
    rx: fsize,
    ry: fsize,
    x_rotation: fsize,
    large_arc: bool,
    sweep: bool,
    to: Point,
    curve_tol: fsize,
) {
    let (mut rx, mut ry) = (rx.abs(), ry.abs());
    if rx == 0.0 || ry == 0.0 || from == to {
        points.push(to);
        return;
    }

    let phi = x_rotation.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let dx2 = (from.0 - to.0) / 2.0;
    let dy2 = (from.1 - to.1) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    //scale radii up if the endpoints are too far apart
    let lambda = (x1p / rx).powi(2) + (y1p / ry).powi(2);
    if lambda > 1.0 {
        let scale = lambda.sqrt();
        rx *= scale;
        ry *= scale;
    }

    let num = (rx * ry).powi(2) - (rx * y1p).powi(2) - (ry * x1p).powi(2);
    let den = (rx * y1p).powi(2) + (ry * x1p).powi(2);
    let mut coef = (num.max(0.0) / den).sqrt();
    if large_arc == sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (from.0 + to.0) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from.1 + to.1) / 2.0;

    let angle = |ux: fsize, uy: fsize, vx: fsize, vy: fsize| -> fsize {
        (ux * vy - uy * vx).atan2(ux * vx + uy * vy)
    };
    let theta1 = angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !sweep && delta > 0.0 {
        delta -= 2.0 * std::f64::consts::PI;
    }
    if sweep && delta < 0.0 {
        delta += 2.0 * std::f64::consts::PI;
    }

    let arc_len = delta.abs() * rx.max(ry);
    let steps = curve_steps(arc_len, curve_tol);
    for i in 1..=steps {
        let theta = theta1 + delta * i as fsize / steps as fsize;
        let (sin_t, cos_t) = theta.sin_cos();
        points.push(Point(
            cx + rx * cos_t * cos_phi - ry * sin_t * sin_phi,
            cy + rx * cos_t * sin_phi + ry * sin_t * cos_phi,
        ));
    }
    //snap the final sample to the exact endpoint
    *points.last_mut().expect("at least one sample") = to;
}

/// Total length of a polyline, including the closing edge if `closed`.
pub fn polyline_length(points: &[Point], closed: bool) -> fsize {
    if points.len() < 2 {
        return 0.0;
    }
    let open: fsize = points
        .windows(2)
        .map(|w| w[0].distance_to(&w[1]))
        .sum();
    match closed {
        true => open + points[points.len() - 1].distance_to(&points[0]),
        false => open,
    }
}

/// Resamples a closed polyline uniformly by arc length at the given spacing,
/// producing at least three points.
pub fn resample_closed(points: &[Point], spacing: fsize) -> Vec<Point> {
    let total = polyline_length(points, true);
    if total == 0.0 {
        return points.to_vec();
    }
    let n = usize::max(3, (total / spacing).ceil() as usize);
    let step = total / n as fsize;

    let mut resampled = Vec::with_capacity(n);
    let mut walked = 0.0;
    let mut next_at = 0.0;
    let mut emitted = 0;

    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let len = a.distance_to(&b);
        if len == 0.0 {
            continue;
        }
        while emitted < n && next_at <= walked + len {
            let t = (next_at - walked) / len;
            resampled.push(Point(a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1)));
            emitted += 1;
            next_at += step;
        }
        walked += len;
    }
    //numeric leftovers: pad with the start vertex spacing if short (should not happen)
    while emitted < n {
        resampled.push(points[0]);
        emitted += 1;
    }

    resampled
}
