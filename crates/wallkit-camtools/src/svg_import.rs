//! SVG stroke extraction
//!
//! Walks an SVG document and reduces every stroked shape to
//! [`DrawablePath`]s in document order. Each subpath becomes its own
//! drawable path so that pen-up travel can be planned between them.
//!
//! Supported elements: `path`, `line`, `polyline`, `polygon`, `rect`
//! (including rounded corners), `circle` and `ellipse`. `transform`
//! attributes and inherited `stroke` / `fill` / `style` values are applied.
//! Fills, text, images and gradients are ignored.
//!
//! Malformed documents never fail: they produce an empty (or truncated) path
//! list and a warning.

use crate::error::PlotterResult;
use lyon::geom::{
    point, vector, Angle, Arc, CubicBezierSegment, LineSegment, QuadraticBezierSegment, Transform,
};
use std::path::Path as StdPath;
use std::str::FromStr;
use svgtypes::{PointsParser, SimplePathSegment, SimplifyingPathParser};
use tracing::{debug, warn};
use wallkit_core::{DrawablePath, Segment, WallPoint};

/// Stroke assumed for shapes that declare neither a stroke nor a fill.
pub const DEFAULT_STROKE: &str = "#000000";

/// Subtrees that never render directly.
const NON_RENDERING: &[&str] = &[
    "defs", "clipPath", "mask", "symbol", "marker", "pattern", "style", "script", "title",
    "desc", "metadata",
];

/// Converts SVG documents into drawable stroke paths.
#[derive(Debug, Clone)]
pub struct SvgImporter {
    default_stroke: String,
}

impl Default for SvgImporter {
    fn default() -> Self {
        Self {
            default_stroke: DEFAULT_STROKE.to_string(),
        }
    }
}

impl SvgImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and import an SVG file.
    ///
    /// Only a failure to read the file is an error; unparseable content
    /// yields an empty list.
    pub fn import_file<P: AsRef<StdPath>>(&self, path: P) -> PlotterResult<Vec<DrawablePath>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(self.import_str(&content))
    }

    /// Import SVG from string content.
    pub fn import_str(&self, svg_content: &str) -> Vec<DrawablePath> {
        let doc = match roxmltree::Document::parse(svg_content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Unreadable SVG document, nothing to draw: {}", e);
                return Vec::new();
            }
        };

        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            warn!(
                "Root element is <{}>, not <svg>; nothing to draw",
                root.tag_name().name()
            );
            return Vec::new();
        }

        let mut paths = Vec::new();
        self.visit(root, &Inherited::default(), &mut paths);
        debug!("Extracted {} drawable paths", paths.len());
        paths
    }

    fn visit(
        &self,
        node: roxmltree::Node<'_, '_>,
        parent: &Inherited,
        out: &mut Vec<DrawablePath>,
    ) {
        if !node.is_element() {
            return;
        }
        let tag = node.tag_name().name();
        if NON_RENDERING.contains(&tag) {
            return;
        }

        let Some(style) = parent.child(node) else {
            return;
        };

        if let Some(stroke) = self.stroke_for(&style) {
            let origin = describe(node);
            let mut builder = StrokeBuilder::new(&style.transform, &stroke, &origin, out);
            match tag {
                "path" => build_path(node, &mut builder),
                "line" => build_line(node, &mut builder),
                "polyline" => build_polyline(node, &mut builder, false),
                "polygon" => build_polyline(node, &mut builder, true),
                "rect" => build_rect(node, &mut builder),
                "circle" => {
                    let r = number_attr(node, "r");
                    build_ellipse(node, &mut builder, r, r);
                }
                "ellipse" => {
                    let (rx, ry) = (number_attr(node, "rx"), number_attr(node, "ry"));
                    build_ellipse(node, &mut builder, rx, ry);
                }
                _ => {}
            }
            builder.finish();
        }

        for child in node.children() {
            self.visit(child, &style, out);
        }
    }

    /// Stroke token for an element, or `None` when it must not be drawn.
    fn stroke_for(&self, style: &Inherited) -> Option<String> {
        match &style.stroke {
            Some(stroke) if is_none_paint(stroke) => None,
            Some(stroke) => Some(stroke.clone()),
            None => match &style.fill {
                Some(fill) if !is_none_paint(fill) => None,
                _ => Some(self.default_stroke.clone()),
            },
        }
    }
}

/// Paint and transform state inherited down the element tree.
#[derive(Debug, Clone)]
struct Inherited {
    stroke: Option<String>,
    fill: Option<String>,
    transform: Transform<f64>,
}

impl Default for Inherited {
    fn default() -> Self {
        Self {
            stroke: None,
            fill: None,
            transform: Transform::identity(),
        }
    }
}

impl Inherited {
    /// State for `node`, or `None` if the element is not displayed.
    fn child(&self, node: roxmltree::Node<'_, '_>) -> Option<Self> {
        let mut next = self.clone();
        let mut display = node.attribute("display").map(str::to_string);

        if let Some(v) = node.attribute("stroke") {
            next.set_stroke(v);
        }
        if let Some(v) = node.attribute("fill") {
            next.set_fill(v);
        }
        // Style declarations win over presentation attributes.
        if let Some(style) = node.attribute("style") {
            for (key, value) in style_declarations(style) {
                match key {
                    "stroke" => next.set_stroke(value),
                    "fill" => next.set_fill(value),
                    "display" => display = Some(value.to_string()),
                    _ => {}
                }
            }
        }
        if display.as_deref().map(str::trim) == Some("none") {
            return None;
        }

        if let Some(t) = node.attribute("transform") {
            match svgtypes::Transform::from_str(t) {
                Ok(t) => {
                    let local = Transform::new(t.a, t.b, t.c, t.d, t.e, t.f);
                    next.transform = local.then(&self.transform);
                }
                Err(e) => warn!("Ignoring invalid transform '{}': {}", t, e),
            }
        }
        Some(next)
    }

    fn set_stroke(&mut self, value: &str) {
        if value.trim() != "inherit" {
            self.stroke = Some(value.trim().to_string());
        }
    }

    fn set_fill(&mut self, value: &str) {
        if value.trim() != "inherit" {
            self.fill = Some(value.trim().to_string());
        }
    }
}

fn is_none_paint(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("none") || v.eq_ignore_ascii_case("transparent")
}

fn style_declarations(style: &str) -> impl Iterator<Item = (&str, &str)> {
    style
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value.strip_suffix("!important").unwrap_or(value).trim();
            (key.trim(), value)
        })
}

fn describe(node: roxmltree::Node<'_, '_>) -> String {
    let tag = node.tag_name().name();
    match node.attribute("id") {
        Some(id) => format!("{}#{}", tag, id),
        None => {
            let pos = node.document().text_pos_at(node.range().start);
            format!("{} at line {}", tag, pos.row)
        }
    }
}

fn number_attr(node: roxmltree::Node<'_, '_>, name: &str) -> Option<f64> {
    let value = node.attribute(name)?;
    match svgtypes::Length::from_str(value) {
        Ok(len) => Some(len.number),
        Err(_) => {
            warn!("Ignoring invalid {}='{}' on <{}>", name, value, node.tag_name().name());
            None
        }
    }
}

/// Accumulates the subpaths of one element, applying its transform.
struct StrokeBuilder<'a> {
    transform: &'a Transform<f64>,
    stroke: &'a str,
    origin: &'a str,
    out: &'a mut Vec<DrawablePath>,
    segments: Vec<Segment>,
    start: WallPoint,
    cursor: WallPoint,
}

impl<'a> StrokeBuilder<'a> {
    fn new(
        transform: &'a Transform<f64>,
        stroke: &'a str,
        origin: &'a str,
        out: &'a mut Vec<DrawablePath>,
    ) -> Self {
        let origin_point = transform.transform_point(point(0.0, 0.0));
        Self {
            transform,
            stroke,
            origin,
            out,
            segments: Vec::new(),
            start: origin_point,
            cursor: origin_point,
        }
    }

    fn map(&self, p: WallPoint) -> WallPoint {
        self.transform.transform_point(p)
    }

    fn move_to(&mut self, p: WallPoint) {
        self.flush();
        self.start = self.map(p);
        self.cursor = self.start;
    }

    fn line_to(&mut self, p: WallPoint) {
        let to = self.map(p);
        self.push(Segment::Line(LineSegment { from: self.cursor, to }));
    }

    fn quadratic_to(&mut self, ctrl: WallPoint, p: WallPoint) {
        let seg = QuadraticBezierSegment {
            from: self.cursor,
            ctrl: self.map(ctrl),
            to: self.map(p),
        };
        self.push(Segment::Quadratic(seg));
    }

    fn cubic_to(&mut self, ctrl1: WallPoint, ctrl2: WallPoint, p: WallPoint) {
        let seg = CubicBezierSegment {
            from: self.cursor,
            ctrl1: self.map(ctrl1),
            ctrl2: self.map(ctrl2),
            to: self.map(p),
        };
        self.push(Segment::Cubic(seg));
    }

    /// Elliptical arc around `center` (untransformed), angles in degrees,
    /// Y down.
    fn arc(&mut self, center: WallPoint, rx: f64, ry: f64, start_deg: f64, sweep_deg: f64) {
        let arc = Arc {
            center,
            radii: vector(rx, ry),
            start_angle: Angle::degrees(start_deg),
            sweep_angle: Angle::degrees(sweep_deg),
            x_rotation: Angle::zero(),
        };
        arc.for_each_cubic_bezier(&mut |c: &CubicBezierSegment<f64>| {
            self.cubic_to(c.ctrl1, c.ctrl2, c.to);
        });
    }

    fn close(&mut self) {
        if !self.segments.is_empty() && (self.cursor - self.start).length() > 1e-9 {
            let to = self.start;
            self.push(Segment::Line(LineSegment { from: self.cursor, to }));
        }
        self.flush();
        self.cursor = self.start;
    }

    fn push(&mut self, segment: Segment) {
        self.cursor = segment.to();
        self.segments.push(segment);
    }

    fn flush(&mut self) {
        if !self.segments.is_empty() {
            let segments = std::mem::take(&mut self.segments);
            self.out
                .push(DrawablePath::new(segments, self.stroke, self.origin));
        }
    }

    fn finish(mut self) {
        self.flush();
    }
}

fn build_path(node: roxmltree::Node<'_, '_>, b: &mut StrokeBuilder<'_>) {
    let Some(data) = node.attribute("d") else {
        return;
    };
    for segment in SimplifyingPathParser::from(data) {
        match segment {
            Ok(SimplePathSegment::MoveTo { x, y }) => b.move_to(point(x, y)),
            Ok(SimplePathSegment::LineTo { x, y }) => b.line_to(point(x, y)),
            Ok(SimplePathSegment::Quadratic { x1, y1, x, y }) => {
                b.quadratic_to(point(x1, y1), point(x, y))
            }
            Ok(SimplePathSegment::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            }) => b.cubic_to(point(x1, y1), point(x2, y2), point(x, y)),
            Ok(SimplePathSegment::ClosePath) => b.close(),
            Err(e) => {
                // Render up to the first error, as SVG viewers do.
                warn!("Invalid path data in {}: {}", b.origin, e);
                break;
            }
        }
    }
}

fn build_line(node: roxmltree::Node<'_, '_>, b: &mut StrokeBuilder<'_>) {
    let coord = |name| number_attr(node, name).unwrap_or(0.0);
    b.move_to(point(coord("x1"), coord("y1")));
    b.line_to(point(coord("x2"), coord("y2")));
}

fn build_polyline(node: roxmltree::Node<'_, '_>, b: &mut StrokeBuilder<'_>, closed: bool) {
    let Some(points) = node.attribute("points") else {
        return;
    };
    let mut iter = PointsParser::from(points);
    let Some((x, y)) = iter.next() else {
        return;
    };
    b.move_to(point(x, y));
    for (x, y) in iter {
        b.line_to(point(x, y));
    }
    if closed {
        b.close();
    }
}

fn build_rect(node: roxmltree::Node<'_, '_>, b: &mut StrokeBuilder<'_>) {
    let x = number_attr(node, "x").unwrap_or(0.0);
    let y = number_attr(node, "y").unwrap_or(0.0);
    let w = number_attr(node, "width").unwrap_or(0.0);
    let h = number_attr(node, "height").unwrap_or(0.0);
    if w <= 0.0 || h <= 0.0 {
        return;
    }

    // A missing radius takes the value of the other one.
    let (rx, ry) = match (number_attr(node, "rx"), number_attr(node, "ry")) {
        (Some(rx), Some(ry)) => (rx, ry),
        (Some(r), None) | (None, Some(r)) => (r, r),
        (None, None) => (0.0, 0.0),
    };
    let rx = rx.clamp(0.0, w / 2.0);
    let ry = ry.clamp(0.0, h / 2.0);

    if rx <= 0.0 || ry <= 0.0 {
        b.move_to(point(x, y));
        b.line_to(point(x + w, y));
        b.line_to(point(x + w, y + h));
        b.line_to(point(x, y + h));
        b.close();
        return;
    }

    b.move_to(point(x + rx, y));
    b.line_to(point(x + w - rx, y));
    b.arc(point(x + w - rx, y + ry), rx, ry, -90.0, 90.0);
    b.line_to(point(x + w, y + h - ry));
    b.arc(point(x + w - rx, y + h - ry), rx, ry, 0.0, 90.0);
    b.line_to(point(x + rx, y + h));
    b.arc(point(x + rx, y + h - ry), rx, ry, 90.0, 90.0);
    b.line_to(point(x, y + ry));
    b.arc(point(x + rx, y + ry), rx, ry, 180.0, 90.0);
    b.close();
}

fn build_ellipse(
    node: roxmltree::Node<'_, '_>,
    b: &mut StrokeBuilder<'_>,
    rx: Option<f64>,
    ry: Option<f64>,
) {
    let (Some(rx), Some(ry)) = (rx, ry) else {
        return;
    };
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let cx = number_attr(node, "cx").unwrap_or(0.0);
    let cy = number_attr(node, "cy").unwrap_or(0.0);

    b.move_to(point(cx + rx, cy));
    b.arc(point(cx, cy), rx, ry, 0.0, 360.0);
    b.close();
}
