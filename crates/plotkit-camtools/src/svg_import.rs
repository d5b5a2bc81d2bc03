//! SVG path import
//!
//! Reads the `<path>` elements of an SVG document (typically the tracer's
//! output) into [`VectorPath`]s of lines and cubic Béziers. Group and path
//! `transform` attributes are applied; quadratic curves and elliptical arcs
//! are promoted to cubics so downstream code only sees the two segment kinds.

use crate::error::{FileFormatError, FileFormatResult};
use lyon::geom::{ArcFlags, SvgArc};
use lyon::math::{point, vector, Angle, Point as LyonPoint, Transform};
use lyon::path::{Event, Path};
use plotkit_core::{PathSegment, Point, VectorPath};
use regex::Regex;
use std::path::Path as StdPath;
use tracing::{debug, warn};

fn regex(pattern: &str) -> FileFormatResult<Regex> {
    Regex::new(pattern).map_err(|e| FileFormatError::SvgParseError(e.to_string()))
}

/// Load and parse an SVG file
pub fn load_svg_paths(file_path: &StdPath) -> FileFormatResult<Vec<VectorPath>> {
    let content = std::fs::read_to_string(file_path)?;
    if content.trim().is_empty() {
        return Err(FileFormatError::EmptyFile(file_path.display().to_string()));
    }
    let paths = parse_svg_paths(&content)?;
    debug!("Imported {} paths from {}", paths.len(), file_path.display());
    Ok(paths)
}

/// Parse every `<path>` of an SVG document
///
/// A document without paths yields an empty list.
pub fn parse_svg_paths(content: &str) -> FileFormatResult<Vec<VectorPath>> {
    let re_tag = regex(r"<(/?)(g|path)\b([^>]*?)(/?)>")?;
    let re_transform = regex(r#"\btransform\s*=\s*["']([^"']*)["']"#)?;
    let re_d = regex(r#"\bd\s*=\s*["']([^"']*)["']"#)?;

    let mut groups: Vec<Transform> = Vec::new();
    let mut all_paths = Vec::new();

    for caps in re_tag.captures_iter(content) {
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();
        let attrs = &caps[3];

        let inherited = groups.last().copied().unwrap_or_else(Transform::identity);
        let local = match re_transform.captures(attrs) {
            Some(t) => parse_transform(&t[1])?,
            None => Transform::identity(),
        };
        // Child transform applies first, then the enclosing groups.
        let combined = local.then(&inherited);

        match &caps[2] {
            "g" if closing => {
                groups.pop();
            }
            "g" if !self_closing => groups.push(combined),
            "g" => {}
            _ if closing => {}
            _ => {
                let Some(d) = re_d.captures(attrs) else {
                    continue;
                };
                let path = build_path_from_svg_data(&d[1])?.transformed(&combined);
                let vector_path = to_vector_path(&path);
                if !vector_path.is_empty() {
                    all_paths.push(vector_path);
                }
            }
        }
    }

    Ok(all_paths)
}

/// Parse an SVG `transform` attribute into a single affine transform
pub fn parse_transform(transform_str: &str) -> FileFormatResult<Transform> {
    let re_item = regex(r"([A-Za-z]+)\s*\(([^)]*)\)")?;
    let mut total = Transform::identity();

    for caps in re_item.captures_iter(transform_str) {
        let name = &caps[1];
        let args: Vec<f32> = caps[2]
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|e| {
                FileFormatError::SvgParseError(format!("transform '{}': {}", transform_str, e))
            })?;

        let item = match (name, args.as_slice()) {
            ("matrix", [a, b, c, d, e, f]) => Transform::new(*a, *b, *c, *d, *e, *f),
            ("translate", [tx]) => Transform::translation(*tx, 0.0),
            ("translate", [tx, ty]) => Transform::translation(*tx, *ty),
            ("scale", [s]) => Transform::scale(*s, *s),
            ("scale", [sx, sy]) => Transform::scale(*sx, *sy),
            ("rotate", [deg]) => Transform::rotation(Angle::degrees(*deg)),
            ("rotate", [deg, cx, cy]) => Transform::translation(-*cx, -*cy)
                .then_rotate(Angle::degrees(*deg))
                .then_translate(vector(*cx, *cy)),
            ("skewX", [deg]) => Transform::new(1.0, 0.0, deg.to_radians().tan(), 1.0, 0.0, 0.0),
            ("skewY", [deg]) => Transform::new(1.0, deg.to_radians().tan(), 0.0, 1.0, 0.0, 0.0),
            _ => {
                return Err(FileFormatError::SvgParseError(format!(
                    "unsupported transform '{}({})'",
                    name, &caps[2]
                )))
            }
        };
        // Items apply right to left.
        total = item.then(&total);
    }

    Ok(total)
}

/// Tokenize SVG path data into command letters and numbers
///
/// Numbers are also split where a sign starts a new value (`10-5` is two
/// tokens), except inside an exponent.
pub fn tokenize_svg_path(path_data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current_token = String::new();

    for ch in path_data.chars() {
        match ch {
            'M' | 'm' | 'L' | 'l' | 'H' | 'h' | 'V' | 'v' | 'C' | 'c' | 'S' | 's' | 'Q' | 'q'
            | 'T' | 't' | 'A' | 'a' | 'Z' | 'z' => {
                if !current_token.is_empty() {
                    tokens.push(std::mem::take(&mut current_token));
                }
                tokens.push(ch.to_string());
            }
            ' ' | ',' | '\n' | '\r' | '\t' => {
                if !current_token.is_empty() {
                    tokens.push(std::mem::take(&mut current_token));
                }
            }
            '-' | '+' if !current_token.is_empty() && !current_token.ends_with(['e', 'E']) => {
                tokens.push(std::mem::take(&mut current_token));
                current_token.push(ch);
            }
            _ => current_token.push(ch),
        }
    }

    if !current_token.is_empty() {
        tokens.push(current_token);
    }

    tokens
}

fn is_command(token: &str) -> bool {
    token.len() == 1 && token.chars().all(|c| c.is_ascii_alphabetic())
}

/// Cursor over tokenized path data
struct PathData {
    tokens: Vec<String>,
    pos: usize,
}

impl PathData {
    fn has_number(&self) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|t| !is_command(t))
    }

    fn number(&mut self) -> FileFormatResult<f32> {
        let token = self
            .tokens
            .get(self.pos)
            .filter(|t| !is_command(t))
            .ok_or_else(|| FileFormatError::SvgParseError("missing path operand".to_string()))?;
        let value = token.parse::<f32>().map_err(|_| {
            FileFormatError::SvgParseError(format!("invalid path operand '{}'", token))
        })?;
        self.pos += 1;
        Ok(value)
    }

    fn flag(&mut self) -> FileFormatResult<bool> {
        Ok(self.number()? != 0.0)
    }

    fn pair(&mut self, relative: bool, current: LyonPoint) -> FileFormatResult<LyonPoint> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(if relative {
            point(current.x + x, current.y + y)
        } else {
            point(x, y)
        })
    }
}

/// Build a lyon path from SVG path data
fn build_path_from_svg_data(data_str: &str) -> FileFormatResult<Path> {
    let mut data = PathData {
        tokens: tokenize_svg_path(data_str),
        pos: 0,
    };
    let mut builder = Path::builder();
    let mut current = point(0.0, 0.0);
    let mut start = point(0.0, 0.0);
    let mut subpath_active = false;
    // Reflection source for S/s and T/t
    let mut last_cubic_ctrl: Option<LyonPoint> = None;
    let mut last_quad_ctrl: Option<LyonPoint> = None;
    let mut command: Option<char> = None;

    while data.pos < data.tokens.len() {
        let token = &data.tokens[data.pos];
        if is_command(token) {
            command = token.chars().next();
            data.pos += 1;
        } else if command.is_none() {
            return Err(FileFormatError::SvgParseError(format!(
                "path data must start with a command, found '{}'",
                token
            )));
        }

        let Some(cmd) = command else { break };
        let relative = cmd.is_ascii_lowercase();

        if !matches!(cmd, 'M' | 'm' | 'Z' | 'z') && !subpath_active {
            builder.begin(current);
            start = current;
            subpath_active = true;
        }

        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match cmd.to_ascii_uppercase() {
            'M' => {
                current = data.pair(relative, current)?;
                if subpath_active {
                    builder.end(false);
                }
                builder.begin(current);
                start = current;
                subpath_active = true;
                // Further pairs are implicit line-tos.
                command = Some(if relative { 'l' } else { 'L' });
            }
            'L' => {
                current = data.pair(relative, current)?;
                builder.line_to(current);
            }
            'H' => {
                let x = data.number()?;
                current.x = if relative { current.x + x } else { x };
                builder.line_to(current);
            }
            'V' => {
                let y = data.number()?;
                current.y = if relative { current.y + y } else { y };
                builder.line_to(current);
            }
            'C' => {
                let ctrl1 = data.pair(relative, current)?;
                let ctrl2 = data.pair(relative, current)?;
                let to = data.pair(relative, current)?;
                builder.cubic_bezier_to(ctrl1, ctrl2, to);
                cubic_ctrl = Some(ctrl2);
                current = to;
            }
            'S' => {
                let ctrl1 = last_cubic_ctrl
                    .map(|c| point(2.0 * current.x - c.x, 2.0 * current.y - c.y))
                    .unwrap_or(current);
                let ctrl2 = data.pair(relative, current)?;
                let to = data.pair(relative, current)?;
                builder.cubic_bezier_to(ctrl1, ctrl2, to);
                cubic_ctrl = Some(ctrl2);
                current = to;
            }
            'Q' => {
                let ctrl = data.pair(relative, current)?;
                let to = data.pair(relative, current)?;
                builder.quadratic_bezier_to(ctrl, to);
                quad_ctrl = Some(ctrl);
                current = to;
            }
            'T' => {
                let ctrl = last_quad_ctrl
                    .map(|c| point(2.0 * current.x - c.x, 2.0 * current.y - c.y))
                    .unwrap_or(current);
                let to = data.pair(relative, current)?;
                builder.quadratic_bezier_to(ctrl, to);
                quad_ctrl = Some(ctrl);
                current = to;
            }
            'A' => {
                let rx = data.number()?;
                let ry = data.number()?;
                let x_rotation = data.number()?;
                let large_arc = data.flag()?;
                let sweep = data.flag()?;
                let to = data.pair(relative, current)?;
                let arc = SvgArc {
                    from: current,
                    to,
                    radii: vector(rx.abs(), ry.abs()),
                    x_rotation: Angle::degrees(x_rotation),
                    flags: ArcFlags { large_arc, sweep },
                };
                if arc.is_straight_line() {
                    builder.line_to(to);
                } else {
                    arc.to_arc().for_each_cubic_bezier(&mut |ctrl| {
                        builder.cubic_bezier_to(ctrl.ctrl1, ctrl.ctrl2, ctrl.to);
                    });
                }
                current = to;
            }
            'Z' => {
                if subpath_active {
                    builder.close();
                    subpath_active = false;
                }
                current = start;
                command = None;
            }
            other => {
                warn!("Skipping unsupported path command '{}'", other);
                while data.has_number() {
                    data.pos += 1;
                }
                command = None;
            }
        }

        last_cubic_ctrl = cubic_ctrl;
        last_quad_ctrl = quad_ctrl;

        if command.is_some() && !data.has_number() {
            // Next token is a new command letter (or the end).
            command = None;
        }
    }

    if subpath_active {
        builder.end(false);
    }
    Ok(builder.build())
}

fn to_point(p: LyonPoint) -> Point {
    Point::new(p.x as f64, p.y as f64)
}

/// Convert lyon path events into line and cubic segments
fn to_vector_path(path: &Path) -> VectorPath {
    let mut segments = Vec::new();

    for event in path.iter() {
        match event {
            Event::Begin { .. } => {}
            Event::Line { from, to } => segments.push(PathSegment::Line {
                start: to_point(from),
                end: to_point(to),
            }),
            Event::Quadratic { from, ctrl, to } => {
                // Degree elevation: each cubic control sits 2/3 of the way to the quadratic one.
                let control1 = from + (ctrl - from) * (2.0 / 3.0);
                let control2 = to + (ctrl - to) * (2.0 / 3.0);
                segments.push(PathSegment::CubicBezier {
                    start: to_point(from),
                    control1: to_point(control1),
                    control2: to_point(control2),
                    end: to_point(to),
                });
            }
            Event::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => segments.push(PathSegment::CubicBezier {
                start: to_point(from),
                control1: to_point(ctrl1),
                control2: to_point(ctrl2),
                end: to_point(to),
            }),
            Event::End { last, first, close } => {
                if close && last != first {
                    segments.push(PathSegment::Line {
                        start: to_point(last),
                        end: to_point(first),
                    });
                }
            }
        }
    }

    VectorPath::new(segments)
}
