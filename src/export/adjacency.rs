//! Plain text adjacency listing.
//!
//! One block per module, sorted by name:
//!
//! ```text
//! Module: sale
//!   Depends on: account, mail
//!   Used by: None
//! ```

use super::{adjacency_records, Exporter};
use crate::graph::ModuleGraph;
use std::io::{self, Write};

/// Text exporter implementation.
pub struct TextExporter;

fn join_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}

impl Exporter for TextExporter {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        for record in adjacency_records(graph) {
            writeln!(writer, "Module: {}", record.module)?;
            writeln!(writer, "  Depends on: {}", join_or_none(&record.depends_on))?;
            writeln!(writer, "  Used by: {}", join_or_none(&record.used_by))?;
            writeln!(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Manifest;

    fn render(graph: &ModuleGraph) -> String {
        let mut output = Vec::new();
        TextExporter.export(graph, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_text_listing() {
        let graph = ModuleGraph::from_manifests(vec![
            Manifest::new("sale", ["mail", "account"]),
            Manifest::new("account", ["mail"]),
        ]);

        let expected = "\
Module: account
  Depends on: mail
  Used by: sale

Module: mail
  Depends on: None
  Used by: account, sale

Module: sale
  Depends on: account, mail
  Used by: None

";
        assert_eq!(render(&graph), expected);
    }

    #[test]
    fn test_empty_graph_lists_nothing() {
        assert_eq!(render(&ModuleGraph::new()), "");
    }
}
