//! Drawing surfaces
//!
//! The renderer draws through [`DrawingSurface`] in drawing-plane units.
//! [`RasterSurface`] strokes anti-aliased paths into a pixmap saved as PNG,
//! [`SvgSurface`] collects SVG elements and saves them through a temporary
//! file, and [`PreviewSurface`] feeds both at once.

use crate::error::{RenderError, RenderResult};
use image::{ImageFormat, Rgba, RgbaImage};
use plotkit_core::Point;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

/// Colour type shared by all surfaces
pub type Color = Rgba<u8>;

pub const BLACK: Color = Rgba([0, 0, 0, 255]);
pub const WHITE: Color = Rgba([255, 255, 255, 255]);
pub const RED: Color = Rgba([255, 0, 0, 255]);
pub const BLUE: Color = Rgba([0, 0, 255, 255]);

/// File name of the raster preview
pub const PNG_PREVIEW_NAME: &str = "rendered-output.png";
/// File name of the vector preview
pub const SVG_PREVIEW_NAME: &str = "rendered-output.svg";

/// Something the renderer can draw on
pub trait DrawingSurface {
    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Colour for subsequent primitives
    fn set_color(&mut self, color: Color);

    fn draw_line(&mut self, from: Point, to: Point);

    fn draw_circle(&mut self, center: Point, radius: f64);

    fn draw_label(&mut self, at: Point, text: &str);

    /// Persist the current drawing to `path`
    fn save(&mut self, path: &Path) -> RenderResult<()>;
}

fn ensure_parent_dir(path: &Path) -> RenderResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Stroke width of raster lines, in pixels
const RASTER_LINE_PX: f32 = 1.0;

fn skia_color(color: Color) -> tiny_skia::Color {
    let Rgba([r, g, b, a]) = color;
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

/// Raster preview backed by an anti-aliased `tiny_skia` pixmap
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
    pixels_per_unit: f64,
    color: Color,
    background: Color,
}

impl RasterSurface {
    /// Surface covering `width` x `height` drawing units
    pub fn new(width: f64, height: f64, pixels_per_unit: f64) -> RenderResult<Self> {
        let px = |units: f64| (units * pixels_per_unit).ceil().max(1.0) as u32;
        let (w, h) = (px(width), px(height));
        let mut pixmap = Pixmap::new(w, h).ok_or(RenderError::SurfaceSize {
            width: w,
            height: h,
        })?;
        let background = WHITE;
        pixmap.fill(skia_color(background));
        Ok(Self {
            pixmap,
            pixels_per_unit,
            color: BLACK,
            background,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Copy of the pixels with premultiplication undone
    pub fn image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    /// Stroke `path` (drawing units) in the current colour
    ///
    /// tiny-skia clips against the pixmap, so geometry may lie anywhere.
    fn stroke(&mut self, path: &tiny_skia::Path) {
        let scale = self.pixels_per_unit as f32;
        let mut paint = Paint::default();
        paint.set_color(skia_color(self.color));
        paint.anti_alias = true;
        let stroke = Stroke {
            width: RASTER_LINE_PX / scale,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            path,
            &paint,
            &stroke,
            Transform::from_scale(scale, scale),
            None,
        );
    }
}

impl DrawingSurface for RasterSurface {
    fn clear(&mut self) {
        self.pixmap.fill(skia_color(self.background));
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let Some(path) = pb.finish() {
            self.stroke(&path);
        }
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        if let Some(path) =
            PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        {
            self.stroke(&path);
        }
    }

    fn draw_label(&mut self, _at: Point, _text: &str) {
        // No font rasterizer; labels only appear in the vector preview.
    }

    fn save(&mut self, path: &Path) -> RenderResult<()> {
        ensure_parent_dir(path)?;
        self.image().save_with_format(path, ImageFormat::Png)?;
        debug!("Saved raster preview to {}", path.display());
        Ok(())
    }
}

/// Vector preview written as a standalone SVG document
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    line_width: f64,
    color: Color,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            line_width: 0.1,
            color: BLACK,
            elements: Vec::new(),
        }
    }

    /// Number of primitives drawn since the last save or clear
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Sibling path the document is written to before the final rename
    pub fn temp_path(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!("{}-t.svg", stem))
    }

    fn stroke(&self) -> String {
        let Rgba([r, g, b, _]) = self.color;
        format!("rgb({},{},{})", r, g, b)
    }

    /// Render the collected elements as a complete document
    pub fn document(&self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<svg width="{w:.2}" height="{h:.2}" viewBox="0 0 {w:.2} {h:.2}" xmlns="http://www.w3.org/2000/svg">"#,
            w = self.width,
            h = self.height
        );
        for element in &self.elements {
            svg.push_str(element);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl DrawingSurface for SvgSurface {
    fn clear(&mut self) {
        self.elements.clear();
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.elements.push(format!(
            r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}" stroke-width="{}" />"#,
            from.x,
            from.y,
            to.x,
            to.y,
            self.stroke(),
            self.line_width
        ));
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.elements.push(format!(
            r#"<circle cx="{:.3}" cy="{:.3}" r="{:.3}" fill="none" stroke="{}" stroke-width="{}" />"#,
            center.x,
            center.y,
            radius,
            self.stroke(),
            self.line_width
        ));
    }

    fn draw_label(&mut self, at: Point, text: &str) {
        self.elements.push(format!(
            r#"<text x="{:.3}" y="{:.3}" font-size="3" fill="{}">{}</text>"#,
            at.x,
            at.y,
            self.stroke(),
            escape_text(text)
        ));
    }

    /// Write through `<stem>-t.svg` and rename, so the stable file is never
    /// seen half written. The surface starts empty afterwards.
    fn save(&mut self, path: &Path) -> RenderResult<()> {
        ensure_parent_dir(path)?;
        let temp = Self::temp_path(path);
        std::fs::write(&temp, self.document())?;
        std::fs::rename(&temp, path)?;
        self.elements.clear();
        debug!("Saved vector preview to {}", path.display());
        Ok(())
    }
}

/// Raster and vector preview drawn together
#[derive(Debug, Clone)]
pub struct PreviewSurface {
    pub raster: RasterSurface,
    pub svg: SvgSurface,
}

impl PreviewSurface {
    pub fn new(width: f64, height: f64, pixels_per_unit: f64) -> RenderResult<Self> {
        Ok(Self {
            raster: RasterSurface::new(width, height, pixels_per_unit)?,
            svg: SvgSurface::new(width, height),
        })
    }

    /// Save `rendered-output.png` and `rendered-output.svg` into `dir`
    pub fn save_to(&mut self, dir: &Path) -> RenderResult<()> {
        self.raster.save(&dir.join(PNG_PREVIEW_NAME))?;
        self.svg.save(&dir.join(SVG_PREVIEW_NAME))
    }
}

impl DrawingSurface for PreviewSurface {
    fn clear(&mut self) {
        self.raster.clear();
        self.svg.clear();
    }

    fn set_color(&mut self, color: Color) {
        self.raster.set_color(color);
        self.svg.set_color(color);
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.raster.draw_line(from, to);
        self.svg.draw_line(from, to);
    }

    fn draw_circle(&mut self, center: Point, radius: f64) {
        self.raster.draw_circle(center, radius);
        self.svg.draw_circle(center, radius);
    }

    fn draw_label(&mut self, at: Point, text: &str) {
        self.raster.draw_label(at, text);
        self.svg.draw_label(at, text);
    }

    /// `path` names the preview without extension; `.png` and `.svg` are added
    fn save(&mut self, path: &Path) -> RenderResult<()> {
        self.raster.save(&path.with_extension("png"))?;
        self.svg.save(&path.with_extension("svg"))
    }
}
