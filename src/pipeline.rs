//! End-to-end graph generation.
//!
//! Locates manifests, folds them into a [`ModuleGraph`], and writes the DOT
//! description, rendered image and optional adjacency listing for the full
//! graph and, when a root module is configured, for its dependents and
//! dependencies subgraphs.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{suffixed_path, ConfigError, GraphConfig, ImageFormat};
use crate::export::{self, DotExporter, Exporter, ListFormat};
use crate::graph::{CycleInfo, GraphStats, ModuleGraph};
use crate::metrics::{collect_complexity, ComplexityMap};
use crate::parser::{find_manifest_files, ManifestError, ManifestParser};
use crate::render::GraphvizRenderer;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("No '__manifest__.py' files found in {0}. Is this an Odoo addons directory?")]
    NoManifests(PathBuf),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Files written for one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOutput {
    /// Which graph this is: "full", "dependents" or "dependencies"
    pub label: String,
    /// The DOT description (always written)
    pub dot_path: PathBuf,
    /// The rendered image, if rendering succeeded
    pub image_path: Option<PathBuf>,
    /// Number of modules in the graph
    pub modules: usize,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Statistics of the full graph
    pub stats: GraphStats,
    /// Graph files, full graph first
    pub graphs: Vec<GraphOutput>,
    /// Adjacency listings written
    pub lists: Vec<PathBuf>,
    /// Circular dependencies in the full graph
    pub cycles: Vec<CycleInfo>,
    /// The configured root module, when it was not found in the graph
    pub missing_root: Option<String>,
}

/// Folds the given manifest files into a graph.
///
/// Malformed manifests are logged and skipped.
pub fn build_graph(manifest_paths: &[PathBuf]) -> PipelineResult<ModuleGraph> {
    let mut parser = ManifestParser::new()?;
    let mut graph = ModuleGraph::with_capacity(manifest_paths.len(), manifest_paths.len() * 4);
    let mut skipped = 0;

    for path in manifest_paths {
        match parser.load(path) {
            Some(manifest) => {
                graph.add_manifest(&manifest);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed manifest file(s)", skipped);
    }
    Ok(graph)
}

/// Scans an addons tree and builds its dependency graph.
pub fn scan(addons_path: &Path) -> PipelineResult<ModuleGraph> {
    if !addons_path.is_dir() {
        return Err(ConfigError::InvalidDirectory(addons_path.to_path_buf()).into());
    }

    info!("Searching for manifest files in {}...", addons_path.display());
    let manifest_paths = find_manifest_files(addons_path);
    info!("Found {} manifest files.", manifest_paths.len());

    if manifest_paths.is_empty() {
        return Err(PipelineError::NoManifests(addons_path.to_path_buf()));
    }

    info!("Creating dependency graph...");
    let graph = build_graph(&manifest_paths)?;
    info!(
        modules = graph.node_count(),
        dependencies = graph.edge_count(),
        "dependency graph created"
    );
    Ok(graph)
}

/// Runs a full graph generation as configured.
pub fn run(config: &GraphConfig) -> PipelineResult<RunReport> {
    config.validate()?;
    let graph = scan(&config.addons_path)?;

    fs::create_dir_all(&config.output_dir)
        .map_err(|source| write_error(&config.output_dir, source))?;

    let mut report = RunReport {
        stats: graph.stats(),
        cycles: graph.detect_cycles(),
        ..RunReport::default()
    };
    for cycle in &report.cycles {
        warn!("Circular dependency: {}", cycle.cycle_path());
    }

    let complexity = config
        .metrics
        .then(|| collect_complexity(&config.addons_path, config.metrics_output.as_deref()));
    let renderer = config.render.then(GraphvizRenderer::default);
    let writer = GraphWriter {
        format: config.format,
        renderer: renderer.as_ref(),
        complexity: complexity.as_ref(),
    };

    info!("Visualizing full dependency graph (format: {})...", config.format);
    let base = config.output_dir.join(config.base_name());
    report.graphs.push(writer.write(&graph, "full", &base)?);

    let Some(root) = &config.root_module else {
        if let Some(list_path) = config.resolved_list_path() {
            write_list(&graph, &list_path, config.list_format)?;
            report.lists.push(list_path);
        }
        return Ok(report);
    };

    info!("Extracting dependents subgraph for module '{}' (modules that depend on it)...", root);
    let dependents = graph.dependents_subgraph(root);
    if dependents.is_empty() {
        report.missing_root = Some(root.clone());
        return Ok(report);
    }

    info!("Extracting dependencies subgraph for module '{}' (modules it depends on)...", root);
    let dependencies = graph.dependencies_subgraph(root);

    for (label, subgraph) in [("dependents", &dependents), ("dependencies", &dependencies)] {
        let base = config.output_dir.join(format!("{}_{}", root, label));
        report.graphs.push(writer.write(subgraph, label, &base)?);

        if let Some(list_path) = config.resolved_list_path() {
            let path = suffixed_path(&list_path, label);
            write_list(subgraph, &path, config.list_format)?;
            report.lists.push(path);
        }
    }

    Ok(report)
}

/// Writes DOT files and renders them with shared settings.
struct GraphWriter<'a> {
    format: ImageFormat,
    renderer: Option<&'a GraphvizRenderer>,
    complexity: Option<&'a ComplexityMap>,
}

impl GraphWriter<'_> {
    /// Writes `<base>.gv` and, when rendering is enabled, `<base>.<format>`.
    ///
    /// A rendering failure is logged and leaves `image_path` empty.
    fn write(&self, graph: &ModuleGraph, label: &str, base: &Path) -> PipelineResult<GraphOutput> {
        let dot_path = with_suffix(base, "gv");
        let mut exporter = DotExporter::new();
        if let Some(complexity) = self.complexity {
            exporter = exporter.with_complexity(complexity);
        }
        write_file(&dot_path, |w| exporter.export(graph, w))?;
        info!("Graphviz DOT file saved to {}", dot_path.display());

        let image_path = self.renderer.and_then(|renderer| {
            let image_path = with_suffix(base, self.format.extension());
            match renderer.render(&dot_path, self.format, &image_path) {
                Ok(()) => {
                    info!(
                        "{} file saved to {}",
                        self.format.extension().to_uppercase(),
                        image_path.display()
                    );
                    Some(image_path)
                }
                Err(e) => {
                    warn!(
                        "Error rendering {}: {}",
                        self.format.extension().to_uppercase(),
                        e
                    );
                    None
                }
            }
        });

        Ok(GraphOutput {
            label: label.to_string(),
            dot_path,
            image_path,
            modules: graph.node_count(),
        })
    }
}

/// Writes an adjacency listing for `graph` to `path`.
pub fn write_list(graph: &ModuleGraph, path: &Path, format: ListFormat) -> PipelineResult<()> {
    info!("Generating adjacency list to {}...", path.display());
    write_file(path, |w| export::export(format, graph, w))?;
    info!("Adjacency list saved to {}", path.display());
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> PipelineResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let result = (|| -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        write(&mut writer)?;
        writer.flush()
    })();
    result.map_err(|source| write_error(path, source))
}

fn write_error(path: &Path, source: io::Error) -> PipelineError {
    PipelineError::Write {
        path: path.display().to_string(),
        source,
    }
}

/// Appends `.ext` to a path without replacing an existing extension.
fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_suffix_keeps_dots() {
        assert_eq!(
            with_suffix(Path::new("/out/my.graph"), "gv"),
            PathBuf::from("/out/my.graph.gv")
        );
    }

    #[test]
    fn test_scan_invalid_directory() {
        let result = scan(Path::new("/definitely/not/an/addons/dir"));
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::InvalidDirectory(_)))
        ));
    }

    #[test]
    fn test_build_graph_empty() {
        let graph = build_graph(&[]).unwrap();
        assert!(graph.is_empty());
    }
}
