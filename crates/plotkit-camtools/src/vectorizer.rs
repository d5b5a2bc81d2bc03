//! Bitmap tracing
//!
//! Raster images are traced by external tools: ImageMagick's `mogrify`
//! converts the input to BMP, `mkbitmap` filters it into a bilevel PBM and
//! `potrace` turns that into an SVG, which is imported with
//! [`crate::svg_import`].

use crate::error::VectorizeError;
use crate::svg_import::load_svg_paths;
use plotkit_core::{FilterConfig, VectorPath};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info, warn};

/// File name of the traced SVG inside the work directory
pub const TRACE_OUTPUT_NAME: &str = "conversion-output.svg";

/// Turns a raster image into vector paths
pub trait Vectorizer {
    fn vectorize(
        &self,
        image: &Path,
        filter: &FilterConfig,
    ) -> Result<Vec<VectorPath>, VectorizeError>;
}

/// Executables used by [`PotraceVectorizer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceTools {
    pub mogrify: String,
    pub mkbitmap: String,
    pub potrace: String,
}

impl Default for TraceTools {
    fn default() -> Self {
        Self {
            mogrify: "mogrify".to_string(),
            mkbitmap: "mkbitmap".to_string(),
            potrace: "potrace".to_string(),
        }
    }
}

/// mogrify → mkbitmap → potrace tracer
#[derive(Debug, Clone)]
pub struct PotraceVectorizer {
    work_dir: PathBuf,
    tools: TraceTools,
}

impl PotraceVectorizer {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            tools: TraceTools::default(),
        }
    }

    pub fn with_tools(mut self, tools: TraceTools) -> Self {
        self.tools = tools;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Location of the traced SVG
    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(TRACE_OUTPUT_NAME)
    }

    /// Arguments for `mkbitmap`
    pub fn mkbitmap_args(bitmap: &Path, output: &Path, filter: &FilterConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![bitmap.into(), "-o".into(), output.into()];
        if filter.highpass_enabled() {
            args.push("-f".into());
            args.push(filter.highpass.to_string().into());
        }
        if filter.blur_enabled() {
            args.push("-b".into());
            args.push(filter.blur.to_string().into());
        }
        args
    }

    /// Arguments for `potrace`
    pub fn potrace_args(input: &Path, output: &Path, filter: &FilterConfig) -> Vec<OsString> {
        let turd_size = filter.corner_threshold.round().max(0.0) as u64;
        vec![
            "-t".into(),
            turd_size.to_string().into(),
            "-z".into(),
            "white".into(),
            "-b".into(),
            "svg".into(),
            input.into(),
            "--rotate".into(),
            "0".into(),
            "-o".into(),
            output.into(),
        ]
    }

    fn run_tool(&self, tool: &str, args: &[OsString]) -> Result<(), VectorizeError> {
        info!("Running {}...", tool);
        debug!("{} {:?}", tool, args);
        let start = Instant::now();

        let out = Command::new(tool)
            .args(args)
            .output()
            .map_err(|source| VectorizeError::ToolUnavailable {
                tool: tool.to_string(),
                source,
            })?;

        if !out.status.success() {
            return Err(VectorizeError::ToolFailed {
                tool: tool.to_string(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        info!("{} took {:.2}s", tool, start.elapsed().as_secs_f64());
        Ok(())
    }
}

impl Vectorizer for PotraceVectorizer {
    fn vectorize(
        &self,
        image: &Path,
        filter: &FilterConfig,
    ) -> Result<Vec<VectorPath>, VectorizeError> {
        if !image.is_file() {
            return Err(VectorizeError::ImageNotFound(image.to_path_buf()));
        }
        info!("Converting input file {}", image.display());

        std::fs::create_dir_all(&self.work_dir)?;
        let stem = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let bitmap = self.work_dir.join(format!("{}.bmp", stem));
        let filtered = self.work_dir.join(format!("{}-n.pbm", stem));
        let output = self.output_path();

        let mogrify_args: Vec<OsString> = vec![
            "-path".into(),
            self.work_dir.clone().into(),
            "-format".into(),
            "bmp".into(),
            image.into(),
        ];
        self.run_tool(&self.tools.mogrify, &mogrify_args)?;
        self.run_tool(
            &self.tools.mkbitmap,
            &Self::mkbitmap_args(&bitmap, &filtered, filter),
        )?;
        self.run_tool(
            &self.tools.potrace,
            &Self::potrace_args(&filtered, &output, filter),
        )?;

        let paths = load_svg_paths(&output)?;
        if paths.is_empty() {
            warn!("Tracer found no paths in {}", image.display());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_mkbitmap_args_follow_filter() {
        let filter = FilterConfig::default();
        let args = strings(&PotraceVectorizer::mkbitmap_args(
            Path::new("a.bmp"),
            Path::new("a-n.pbm"),
            &filter,
        ));
        assert_eq!(args, vec!["a.bmp", "-o", "a-n.pbm", "-f", "15"]);

        let filter = FilterConfig {
            highpass: 0.0,
            blur: 2.5,
            ..FilterConfig::default()
        };
        let args = strings(&PotraceVectorizer::mkbitmap_args(
            Path::new("a.bmp"),
            Path::new("a-n.pbm"),
            &filter,
        ));
        assert_eq!(args, vec!["a.bmp", "-o", "a-n.pbm", "-b", "2.5"]);
    }

    #[test]
    fn test_potrace_args() {
        let args = strings(&PotraceVectorizer::potrace_args(
            Path::new("a-n.pbm"),
            Path::new("out.svg"),
            &FilterConfig::default(),
        ));
        assert_eq!(&args[..2], &["-t", "20"]);
        assert!(args.contains(&"white".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.svg"));
    }

    #[test]
    fn test_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let vectorizer = PotraceVectorizer::new(dir.path());
        let err = vectorizer
            .vectorize(&dir.path().join("absent.png"), &FilterConfig::default())
            .unwrap_err();
        assert!(matches!(err, VectorizeError::ImageNotFound(_)));
    }

    #[test]
    fn test_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("input.png");
        std::fs::write(&image, b"not really a png").unwrap();

        let vectorizer = PotraceVectorizer::new(dir.path().join("work")).with_tools(TraceTools {
            mogrify: "plotkit-test-no-such-mogrify".to_string(),
            ..TraceTools::default()
        });
        let err = vectorizer
            .vectorize(&image, &FilterConfig::default())
            .unwrap_err();
        assert!(matches!(err, VectorizeError::ToolUnavailable { .. }));
    }
}
