//! Code complexity metrics collected with `eslintcc`.
//!
//! Complexity is optional decoration for the rendered graph: modules with a
//! higher summed average complexity get a larger label font.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path};
use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};

/// Module name to summed average complexity.
pub type ComplexityMap = HashMap<String, f64>;

/// Base label font size for graph nodes.
pub const BASE_FONT_SIZE: u32 = 12;

/// Largest increase complexity can add to the base font size.
pub const MAX_FONT_BONUS: u32 = 12;

/// Errors that can occur while collecting metrics.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Failed to run eslintcc: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("eslintcc failed: {0}")]
    Failed(String),

    #[error("Failed to parse eslintcc output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write metrics to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Complexity summary for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexitySummary {
    #[serde(default)]
    pub average: f64,
}

/// One entry of the `eslintcc --format=json` report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetrics {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub complexity: ComplexitySummary,
}

/// Runs `npx eslintcc` over `directory` and builds a complexity map.
///
/// Failures are logged and produce an empty map. When `output` is given the
/// raw report is also written there, pretty-printed.
pub fn collect_complexity(directory: &Path, output: Option<&Path>) -> ComplexityMap {
    match run_eslintcc(directory, output) {
        Ok(metrics) => {
            let map = complexity_map(&metrics);
            info!("Collected complexity for {} modules", map.len());
            map
        }
        Err(e) => {
            warn!("{}", e);
            ComplexityMap::new()
        }
    }
}

/// Runs `npx eslintcc --format=json` and parses its report.
pub fn run_eslintcc(directory: &Path, output: Option<&Path>) -> MetricsResult<Vec<FileMetrics>> {
    let result = Command::new("npx")
        .arg("eslintcc")
        .arg("--format=json")
        .arg(directory)
        .output()
        .map_err(MetricsError::Spawn)?;

    if !result.status.success() {
        return Err(MetricsError::Failed(
            String::from_utf8_lossy(&result.stderr).trim().to_string(),
        ));
    }

    parse_report(&String::from_utf8_lossy(&result.stdout), output)
}

/// Parses an eslintcc JSON report, optionally saving it pretty-printed.
pub fn parse_report(report: &str, output: Option<&Path>) -> MetricsResult<Vec<FileMetrics>> {
    let raw: serde_json::Value = serde_json::from_str(report)?;

    if let Some(path) = output {
        let pretty = serde_json::to_string_pretty(&raw)?;
        fs::write(path, pretty).map_err(|source| MetricsError::Write {
            path: path.display().to_string(),
            source,
        })?;
    }

    Ok(serde_json::from_value(raw)?)
}

/// Sums average complexity per module.
///
/// A file belongs to the module named by the path component that follows
/// an `addons` component; files outside any `addons` directory are ignored.
pub fn complexity_map(metrics: &[FileMetrics]) -> ComplexityMap {
    let mut map = ComplexityMap::new();

    for item in metrics {
        if let Some(module) = module_of(&item.file) {
            *map.entry(module).or_insert(0.0) += item.complexity.average;
        }
    }

    map
}

fn module_of(file: &str) -> Option<String> {
    let parts: Vec<&str> = Path::new(file)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    parts
        .windows(2)
        .find(|pair| pair[0] == "addons")
        .map(|pair| pair[1].to_string())
}

/// Label font size for a module with the given complexity.
pub fn font_size(complexity: f64) -> u32 {
    let bonus = (complexity / 10.0).floor().max(0.0) as u32;
    BASE_FONT_SIZE + bonus.min(MAX_FONT_BONUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REPORT: &str = r#"[
        {"file": "/srv/addons/sale/static/src/js/sale.js", "complexity": {"average": 4.5}},
        {"file": "/srv/addons/sale/static/src/js/order.js", "complexity": {"average": 10.5}},
        {"file": "/srv/addons/web/static/src/core.js", "complexity": {"average": 150}},
        {"file": "/srv/other/tool.js", "complexity": {"average": 99}},
        {"file": "/srv/addons/stock/static/empty.js"}
    ]"#;

    #[test]
    fn test_parse_report_and_map() {
        let metrics = parse_report(REPORT, None).unwrap();
        assert_eq!(metrics.len(), 5);

        let map = complexity_map(&metrics);
        assert_eq!(map.get("sale"), Some(&15.0));
        assert_eq!(map.get("web"), Some(&150.0));
        assert_eq!(map.get("stock"), Some(&0.0));
        assert!(!map.contains_key("other"));
    }

    #[test]
    fn test_parse_report_writes_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("metrics.json");

        parse_report(REPORT, Some(&out)).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("\"average\""));
        assert!(written.lines().count() > 5);
    }

    #[test]
    fn test_parse_report_rejects_garbage() {
        assert!(matches!(
            parse_report("not json", None),
            Err(MetricsError::Json(_))
        ));
    }

    #[test]
    fn test_module_of() {
        assert_eq!(module_of("addons/sale/x.js"), Some("sale".into()));
        assert_eq!(module_of("/srv/addons"), None);
        assert_eq!(module_of("/a/addons/sale/x.js"), Some("sale".into()));
        assert_eq!(module_of("/a/b/c.js"), None);
    }

    #[test]
    fn test_font_size() {
        assert_eq!(font_size(0.0), 12);
        assert_eq!(font_size(9.9), 12);
        assert_eq!(font_size(25.0), 14);
        assert_eq!(font_size(500.0), 24);
    }
}
