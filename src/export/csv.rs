//! CSV adjacency listing.
//!
//! Columns: `module,depends_on,used_by,dangling`. Name lists are
//! separated by `;` inside their field.

use super::{adjacency_records, Exporter};
use crate::graph::ModuleGraph;
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

/// Quotes a field containing a separator, quote or line break.
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, graph: &ModuleGraph, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "module,depends_on,used_by,dangling")?;

        for record in adjacency_records(graph) {
            let dangling = graph
                .get_node(&record.module)
                .is_some_and(|node| node.is_dangling());

            writeln!(
                writer,
                "{},{},{},{}",
                escape_field(&record.module),
                escape_field(&record.depends_on.join(";")),
                escape_field(&record.used_by.join(";")),
                dangling
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Manifest;

    #[test]
    fn test_csv_rows() {
        let graph = ModuleGraph::from_manifests(vec![
            Manifest::new("sale", ["account", "mail"]),
            Manifest::new("account", Vec::<&str>::new()),
        ]);

        let mut output = Vec::new();
        CsvExporter.export(&graph, &mut output).unwrap();
        let csv = String::from_utf8(output).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "module,depends_on,used_by,dangling");
        assert_eq!(lines[1], "account,,sale,false");
        assert_eq!(lines[2], "mail,,sale,true");
        assert_eq!(lines[3], "sale,account;mail,,false");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("simple"), "simple");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("a\r\nb"), "\"a\r\nb\"");
    }
}
