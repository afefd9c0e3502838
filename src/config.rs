//! Run configuration.
//!
//! A [`GraphConfig`] carries every input of a graph generation run. It is
//! built once (from the command line or by library callers), validated,
//! and then only read.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::ListFormat;

/// Base file name used when none is configured.
pub const DEFAULT_OUTPUT_NAME: &str = "odoo_dependency_graph";

/// Keyword selecting the full graph instead of a root module.
pub const ALL_MODULES: &str = "all";

/// Errors in the run configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("'{0}' is not a valid directory")]
    InvalidDirectory(PathBuf),

    #[error("Output name must not be empty")]
    EmptyOutputName,
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Image formats the renderer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Scalable vector graphics
    #[default]
    Svg,
    /// Portable document format
    Pdf,
    /// Raster image
    Png,
}

impl ImageFormat {
    /// File extension, also the Graphviz `-T` argument.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Pdf => "pdf",
            ImageFormat::Png => "png",
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "pdf" => Ok(ImageFormat::Pdf),
            "png" => Ok(ImageFormat::Png),
            _ => Err(format!(
                "Unknown image format: '{}'. Valid formats: svg, pdf, png",
                s
            )),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Configuration of one graph generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Root of the addons tree to scan
    pub addons_path: PathBuf,
    /// Directory receiving all output files
    pub output_dir: PathBuf,
    /// Base name of the full graph's files
    pub output_name: String,
    /// Rendered image format
    pub format: ImageFormat,
    /// Root module for dependents/dependencies subgraphs
    pub root_module: Option<String>,
    /// Adjacency listing path; relative paths resolve under `output_dir`
    pub list_path: Option<PathBuf>,
    /// Adjacency listing format
    pub list_format: ListFormat,
    /// Whether to collect complexity metrics
    pub metrics: bool,
    /// Where to save the raw metrics report
    pub metrics_output: Option<PathBuf>,
    /// Whether to invoke Graphviz after writing the DOT files
    pub render: bool,
}

impl GraphConfig {
    /// Creates a configuration with defaults: output next to the addons,
    /// SVG images, full graph only, no listing, no metrics.
    pub fn new(addons_path: impl Into<PathBuf>) -> Self {
        let addons_path = addons_path.into();
        Self {
            output_dir: addons_path.clone(),
            addons_path,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            format: ImageFormat::default(),
            root_module: None,
            list_path: None,
            list_format: ListFormat::default(),
            metrics: false,
            metrics_output: None,
            render: true,
        }
    }

    /// Sets the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the base output name.
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    /// Sets the image format.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the root module. `all` (any case) means no root module.
    pub fn with_root_module(mut self, module: impl Into<String>) -> Self {
        let module = module.into();
        self.root_module = (!module.eq_ignore_ascii_case(ALL_MODULES)).then_some(module);
        self
    }

    /// Requests an adjacency listing.
    pub fn with_list(mut self, path: impl Into<PathBuf>, format: ListFormat) -> Self {
        self.list_path = Some(path.into());
        self.list_format = format;
        self
    }

    /// Enables complexity metrics, optionally saving the raw report.
    pub fn with_metrics(mut self, output: Option<PathBuf>) -> Self {
        self.metrics = true;
        self.metrics_output = output;
        self
    }

    /// Enables or disables Graphviz rendering.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Checks the configuration before any file is written.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.addons_path.is_dir() {
            return Err(ConfigError::InvalidDirectory(self.addons_path.clone()));
        }
        if self.base_name().as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputName);
        }
        Ok(())
    }

    /// The output name with its last extension removed.
    pub fn base_name(&self) -> PathBuf {
        Path::new(&self.output_name).with_extension("")
    }

    /// The listing path resolved against the output directory.
    pub fn resolved_list_path(&self) -> Option<PathBuf> {
        self.list_path.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.output_dir.join(path)
            }
        })
    }
}

/// Inserts `_suffix` before the extension of `path`, or appends it when
/// there is none: `deps.txt` becomes `deps_dependents.txt`.
pub fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(file_name)
}
