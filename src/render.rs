//! Rendering DOT files to images with the Graphviz `dot` binary.

use std::path::Path;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

use crate::config::ImageFormat;

/// Errors that can occur while rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Renders DOT files by invoking a Graphviz layout program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphvizRenderer {
    program: String,
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl GraphvizRenderer {
    /// Creates a renderer using the given layout program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The layout program this renderer runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Renders `dot_path` to `output_path`, waiting for the program to exit.
    pub fn render(
        &self,
        dot_path: &Path,
        format: ImageFormat,
        output_path: &Path,
    ) -> RenderResult<()> {
        debug!(
            program = %self.program,
            input = %dot_path.display(),
            output = %output_path.display(),
            "rendering graph"
        );

        let output = Command::new(&self.program)
            .arg(format!("-T{}", format.extension()))
            .arg(dot_path)
            .arg("-o")
            .arg(output_path)
            .output()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_program() {
        assert_eq!(GraphvizRenderer::default().program(), "dot");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let renderer = GraphvizRenderer::new("addon-graph-no-such-renderer");

        let result = renderer.render(
            &dir.path().join("graph.gv"),
            ImageFormat::Svg,
            &dir.path().join("graph.svg"),
        );

        assert!(matches!(result, Err(RenderError::Spawn { .. })));
        assert!(!dir.path().join("graph.svg").exists());
    }
}
