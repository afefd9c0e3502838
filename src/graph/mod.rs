//! Graph module for module dependency modeling.
//!
//! This module provides the [`ModuleGraph`] struct for folding parsed
//! manifests into a directed graph, extracting dependents and dependencies
//! subgraphs, and detecting circular dependencies.
//!
//! # Example
//!
//! ```rust
//! use addon_graph::graph::ModuleGraph;
//! use addon_graph::parser::Manifest;
//!
//! let graph = ModuleGraph::from_manifests(vec![
//!     Manifest::new("a", ["b"]),
//!     Manifest::new("b", Vec::<&str>::new()),
//! ]);
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! assert_eq!(graph.dependents_subgraph("b").node_count(), 2);
//! ```

mod cycles;
mod module_graph;
mod subgraph;

pub use cycles::CycleInfo;
pub use module_graph::{GraphStats, ModuleGraph, ModuleNode};
