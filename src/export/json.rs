//! JSON export implementation.
//!
//! Exports the adjacency listing with graph statistics and detected cycles
//! for machine-readable output.

use super::{adjacency_records, Exporter};
use crate::graph::{GraphStats, ModuleGraph};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable module record for JSON output.
#[derive(Serialize)]
struct JsonModule {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    dangling: bool,
    depends_on: Vec<String>,
    used_by: Vec<String>,
}

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle {
    modules: Vec<String>,
    path: String,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport {
    summary: GraphStats,
    modules: Vec<JsonModule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    circular_dependencies: Vec<JsonCycle>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        let modules = adjacency_records(graph)
            .into_iter()
            .map(|record| {
                let node = graph.get_node(&record.module);
                JsonModule {
                    title: node.and_then(|n| n.title.clone()),
                    version: node.and_then(|n| n.version.clone()),
                    dangling: node.is_some_and(|n| n.is_dangling()),
                    name: record.module,
                    depends_on: record.depends_on,
                    used_by: record.used_by,
                }
            })
            .collect();

        let circular_dependencies = graph
            .detect_cycles()
            .into_iter()
            .map(|c| JsonCycle {
                path: c.cycle_path(),
                modules: c.members,
            })
            .collect();

        let export = JsonExport {
            summary: graph.stats(),
            modules,
            circular_dependencies,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Manifest;

    fn export_value(graph: &ModuleGraph) -> serde_json::Value {
        let mut output = Vec::new();
        JsonExporter.export(graph, &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_json_export_basic() {
        let mut sale = Manifest::new("sale", ["account"]);
        sale.title = Some("Sales".into());
        sale.version = Some("1.2".into());
        let graph = ModuleGraph::from_manifests(vec![sale]);

        let parsed = export_value(&graph);

        assert_eq!(parsed["summary"]["modules"], 2);
        assert_eq!(parsed["summary"]["dependencies"], 1);
        let modules = parsed["modules"].as_array().unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0]["name"], "account");
        assert_eq!(modules[0]["dangling"], true);
        assert_eq!(modules[0]["used_by"][0], "sale");
        assert_eq!(modules[1]["title"], "Sales");
        assert_eq!(modules[1]["version"], "1.2");
        assert!(parsed.get("circular_dependencies").is_none());
    }

    #[test]
    fn test_json_export_with_cycles() {
        let graph = ModuleGraph::from_manifests(vec![
            Manifest::new("a", ["b"]),
            Manifest::new("b", ["a"]),
        ]);

        let parsed = export_value(&graph);
        let cycles = parsed["circular_dependencies"].as_array().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0]["path"], "a -> b -> a");
    }
}
