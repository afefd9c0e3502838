//! Export functionality for module graphs.
//!
//! This module provides exporters for the adjacency listing (plain text,
//! CSV or JSON) and for the Graphviz DOT description of a graph.

pub mod adjacency;
pub mod csv;
pub mod dot;
pub mod json;

use crate::graph::ModuleGraph;
use std::io::{self, Write};

pub use dot::{fill_color, DotExporter};

/// Adjacency listing format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    /// Plain text records - one block per module
    #[default]
    Text,
    /// CSV format - spreadsheet-friendly
    Csv,
    /// JSON format - machine-readable, full data
    Json,
}

impl std::str::FromStr for ListFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ListFormat::Text),
            "csv" => Ok(ListFormat::Csv),
            "json" => Ok(ListFormat::Json),
            _ => Err(format!(
                "Unknown list format: '{}'. Valid formats: text, csv, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for ListFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListFormat::Text => write!(f, "text"),
            ListFormat::Csv => write!(f, "csv"),
            ListFormat::Json => write!(f, "json"),
        }
    }
}

/// One module's adjacency record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyRecord {
    /// Module name
    pub module: String,
    /// Sorted names of the modules it depends on
    pub depends_on: Vec<String>,
    /// Sorted names of the modules that depend on it
    pub used_by: Vec<String>,
}

/// Builds the adjacency records for every module, sorted by module name.
pub fn adjacency_records(graph: &ModuleGraph) -> Vec<AdjacencyRecord> {
    graph
        .module_names()
        .into_iter()
        .map(|module| AdjacencyRecord {
            depends_on: graph.dependency_names(&module),
            used_by: graph.dependent_names(&module),
            module,
        })
        .collect()
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the graph to the given writer.
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()>;
}

/// Export an adjacency listing in the specified format.
pub fn export<W: Write>(format: ListFormat, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
    match format {
        ListFormat::Text => adjacency::TextExporter.export(graph, writer),
        ListFormat::Csv => csv::CsvExporter.export(graph, writer),
        ListFormat::Json => json::JsonExporter.export(graph, writer),
    }
}

/// Export an adjacency listing to a string.
pub fn export_to_string(format: ListFormat, graph: &ModuleGraph) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
