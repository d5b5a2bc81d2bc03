//! End-to-end plotting pipeline
//!
//! Ties the crates together: trace an image (or import an SVG), fit and
//! flatten the paths, emit the toolpath, write it to disk and render the
//! written program back into previews.

use anyhow::Context;
use plotkit_camtools::{load_svg_paths, PotraceVectorizer, ToolpathEmitter, ToolpathStats, Vectorizer};
use plotkit_core::VectorPath;
use plotkit_settings::Config;
use plotkit_visualizer::{PreviewSurface, RenderReport, RenderSession, ToolpathRenderer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Preview raster resolution
pub const PREVIEW_PIXELS_PER_UNIT: f64 = 2.0;

/// Everything a pipeline run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Vector paths fed to the emitter
    pub paths: usize,
    pub toolpath: ToolpathStats,
    pub render: RenderReport,
    pub gcode_path: PathBuf,
    pub preview_dir: PathBuf,
}

/// Image → toolpath → preview driver
///
/// The render session lives as long as the pipeline, so lift labels keep
/// counting across consecutive runs.
pub struct Pipeline {
    config: Config,
    session: RenderSession,
    vectorizer: Box<dyn Vectorizer>,
}

impl Pipeline {
    /// Pipeline tracing with `potrace`, using the configured work directory
    pub fn new(config: Config) -> Self {
        let vectorizer = PotraceVectorizer::new(config.output.work_dir.clone());
        Self::with_vectorizer(config, Box::new(vectorizer))
    }

    pub fn with_vectorizer(config: Config, vectorizer: Box<dyn Vectorizer>) -> Self {
        let session = RenderSession::new(config.profile.lift_markers);
        Self {
            config,
            session,
            vectorizer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &RenderSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut RenderSession {
        &mut self.session
    }

    /// Trace `image` and plot the result
    pub fn run(&mut self, image: &Path) -> anyhow::Result<PipelineReport> {
        let start = Instant::now();
        let paths = self
            .vectorizer
            .vectorize(image, &self.config.filter)
            .with_context(|| format!("Failed to trace {}", image.display()))?;
        info!("Tracing took {:.2}s", start.elapsed().as_secs_f64());
        self.plot(&paths)
    }

    /// Plot the paths of an existing SVG document
    pub fn convert_svg(&mut self, svg: &Path) -> anyhow::Result<PipelineReport> {
        let paths = load_svg_paths(svg)
            .with_context(|| format!("Failed to import {}", svg.display()))?;
        self.plot(&paths)
    }

    /// Render an existing toolpath program into the preview directory
    pub fn render_only(&mut self, gcode: &Path) -> anyhow::Result<RenderReport> {
        let profile = &self.config.profile;
        let preview_dir = &self.config.output.preview_dir;
        let mut surface = PreviewSurface::new(
            profile.canvas_width,
            profile.canvas_height,
            PREVIEW_PIXELS_PER_UNIT,
        )
        .context("Failed to create preview surface")?;

        let start = Instant::now();
        let report = ToolpathRenderer::new(profile)
            .render_file(gcode, &mut surface, &mut self.session)
            .with_context(|| format!("Failed to render {}", gcode.display()))?;
        surface
            .save_to(preview_dir)
            .with_context(|| format!("Failed to write previews to {}", preview_dir.display()))?;
        info!(
            "Rendering took {:.2}s ({} strokes, {} lifts)",
            start.elapsed().as_secs_f64(),
            report.strokes,
            report.lifts
        );
        Ok(report)
    }

    fn plot(&mut self, paths: &[VectorPath]) -> anyhow::Result<PipelineReport> {
        let gcode_path = self.config.output.gcode_path.clone();

        let start = Instant::now();
        let toolpath = ToolpathEmitter::emit_paths(&self.config.profile, paths)
            .context("Failed to emit toolpath")?;
        toolpath
            .save(&gcode_path)
            .with_context(|| format!("Failed to write {}", gcode_path.display()))?;
        info!("G-code generation took {:.2}s", start.elapsed().as_secs_f64());

        let render = self.render_only(&gcode_path)?;
        Ok(PipelineReport {
            paths: paths.len(),
            toolpath: toolpath.stats,
            render,
            gcode_path,
            preview_dir: self.config.output.preview_dir.clone(),
        })
    }
}
