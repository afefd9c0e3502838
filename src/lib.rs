//! addon-graph - module dependency graph analyzer for Odoo-style addons
//!
//! This crate scans an addons tree for `__manifest__.py` files, builds the
//! module dependency graph, extracts dependents and dependencies subgraphs,
//! detects circular dependencies, and writes Graphviz and adjacency-list
//! reports.

pub mod config;
pub mod export;
pub mod graph;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod render;
