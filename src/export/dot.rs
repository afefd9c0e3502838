//! Graphviz DOT export.
//!
//! Nodes are filled with a blue shade proportional to how many modules
//! depend on them, and a legend cluster summarizes the graph.

use super::Exporter;
use crate::graph::ModuleGraph;
use crate::metrics::{font_size, ComplexityMap, BASE_FONT_SIZE};
use std::io::{self, Write};

/// Comment written at the top of every DOT file.
pub const DEFAULT_COMMENT: &str = "Odoo Modules Dependency Graph";

/// DOT exporter implementation.
#[derive(Debug, Clone, Default)]
pub struct DotExporter<'a> {
    comment: Option<String>,
    complexity: Option<&'a ComplexityMap>,
}

impl<'a> DotExporter<'a> {
    /// Creates an exporter with the default comment and no complexity data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the comment line written above the graph.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Scales node font sizes by module complexity.
    pub fn with_complexity(mut self, complexity: &'a ComplexityMap) -> Self {
        self.complexity = Some(complexity);
        self
    }

    fn node_font_size(&self, module: &str) -> u32 {
        self.complexity
            .and_then(|map| map.get(module))
            .map_or(BASE_FONT_SIZE, |&c| font_size(c))
    }
}

/// Fill colour for a node with `in_degree` dependents.
///
/// The in-degree is normalized against `max_in_degree` (at least 1): no
/// dependents gives white, the maximum gives `#5096ff`.
///
/// # Example
///
/// ```
/// use addon_graph::export::fill_color;
///
/// assert_eq!(fill_color(0, 4), "#ffffff");
/// assert_eq!(fill_color(4, 4), "#5096ff");
/// ```
pub fn fill_color(in_degree: usize, max_in_degree: usize) -> String {
    let max = max_in_degree.max(1) as f64;
    let inverse = 1.0 - (in_degree as f64 / max).min(1.0);
    let red = (80.0 + 175.0 * inverse) as u8;
    let green = (150.0 + 105.0 * inverse) as u8;
    format!("#{:02x}{:02x}ff", red, green)
}

/// Quotes a DOT identifier.
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Exporter for DotExporter<'_> {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        let comment = self.comment.as_deref().unwrap_or(DEFAULT_COMMENT);
        writeln!(writer, "// {}", comment)?;
        writeln!(writer, "digraph {{")?;
        writeln!(writer, "\tgraph [rankdir=LR ratio=fill]")?;
        writeln!(writer, "\tnode [fontname=Arial shape=box style=filled]")?;
        writeln!(writer, "\tedge [fontname=Arial]")?;

        let max_in_degree = graph.max_in_degree();
        for node in graph.get_all_nodes() {
            let color = fill_color(graph.in_degree(&node.name), max_in_degree);
            writeln!(
                writer,
                "\t{} [label={} fillcolor=\"{}\" fontsize={} style=filled]",
                quote(&node.name),
                quote(&node.name),
                color,
                self.node_font_size(&node.name)
            )?;
        }

        for (from, to) in graph.edges() {
            writeln!(writer, "\t{} -> {}", quote(from), quote(to))?;
        }

        let stats = graph.stats();
        writeln!(writer, "\tsubgraph cluster_legend {{")?;
        writeln!(writer, "\t\tlabel=Legend color=gray fontname=Arial fontsize=14")?;
        writeln!(
            writer,
            "\t\t\"__legend_stats\" [label=\"Total Modules: {}\\lTotal Dependencies: {}\\l\
             Leaf Modules: {}\\lBase Modules: {}\\l\" fontname=Arial fontsize=12 shape=note]",
            stats.modules, stats.dependencies, stats.leaf_modules, stats.base_modules
        )?;
        writeln!(writer, "\t}}")?;
        writeln!(writer, "}}")
    }
}
