//! Module dependency graph implementation using petgraph.
//!
//! Provides a directed graph structure for modeling addon module
//! dependencies, built by folding parsed manifests.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::parser::Manifest;

/// Represents a node in the module graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleNode {
    /// Technical module name (e.g., "sale", "account")
    pub name: String,
    /// Human-readable name from the manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Version string from the manifest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Whether a manifest declared this module (false for dangling dependencies)
    pub defined: bool,
}

impl ModuleNode {
    /// Creates a node for a module that no manifest has declared yet.
    ///
    /// # Example
    ///
    /// ```rust
    /// use addon_graph::graph::ModuleNode;
    ///
    /// let node = ModuleNode::new("base");
    /// assert_eq!(node.name, "base");
    /// assert!(!node.defined);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: None,
            defined: false,
        }
    }

    /// Creates a node from a parsed manifest.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            name: manifest.module.clone(),
            title: manifest.title.clone(),
            version: manifest.version.clone(),
            defined: true,
        }
    }

    /// Returns true if no manifest declared this module.
    pub fn is_dangling(&self) -> bool {
        !self.defined
    }
}

/// Summary counts for a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GraphStats {
    /// Number of modules (nodes)
    pub modules: usize,
    /// Number of dependency edges
    pub dependencies: usize,
    /// Modules that depend on nothing (out-degree 0)
    pub leaf_modules: usize,
    /// Modules nothing depends on (in-degree 0)
    pub base_modules: usize,
}

/// A directed graph of module dependencies.
///
/// Edges point from the dependent module to the module it depends on.
/// Edges form a set: declaring the same dependency twice adds one edge.
///
/// # Example
///
/// ```rust
/// use addon_graph::graph::ModuleGraph;
/// use addon_graph::parser::Manifest;
///
/// let graph = ModuleGraph::from_manifests(vec![
///     Manifest::new("sale", ["account", "mail"]),
///     Manifest::new("account", ["base"]),
/// ]);
///
/// assert_eq!(graph.node_count(), 4);
/// assert_eq!(graph.edge_count(), 3);
/// assert!(graph.get_node("mail").unwrap().is_dangling());
/// ```
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    /// The underlying directed graph
    pub(crate) graph: DiGraph<ModuleNode, ()>,
    /// Maps module names to their node indices for O(1) lookup
    pub(crate) node_indices: HashMap<String, NodeIndex>,
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleGraph {
    /// Creates a new empty module graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
        }
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
        }
    }

    /// Builds a graph by folding every manifest into it.
    pub fn from_manifests<I>(manifests: I) -> Self
    where
        I: IntoIterator<Item = Manifest>,
    {
        let mut graph = Self::new();
        for manifest in manifests {
            graph.add_manifest(&manifest);
        }
        graph
    }

    /// Rebuilds a graph wrapper around an existing petgraph graph.
    pub(crate) fn from_inner(graph: DiGraph<ModuleNode, ()>) -> Self {
        let node_indices = graph
            .node_indices()
            .map(|idx| (graph[idx].name.clone(), idx))
            .collect();
        Self {
            graph,
            node_indices,
        }
    }

    /// Adds a module node if it does not exist yet.
    ///
    /// New nodes start out dangling until a manifest declares them.
    ///
    /// # Returns
    ///
    /// The `NodeIndex` of the added or existing node.
    pub fn add_module(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }

        let idx = self.graph.add_node(ModuleNode::new(name));
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    /// Folds one manifest into the graph.
    ///
    /// Ensures a node for the module and for each dependency, then adds an
    /// edge from the module to each dependency. If the module was already
    /// declared by another manifest, its metadata is kept and the edges are
    /// merged.
    pub fn add_manifest(&mut self, manifest: &Manifest) -> NodeIndex {
        let idx = self.add_module(&manifest.module);
        let node = &mut self.graph[idx];
        if node.defined {
            debug!(module = %manifest.module, "module declared by more than one manifest");
        } else {
            *node = ModuleNode::from_manifest(manifest);
        }

        for dependency in &manifest.depends {
            let dep_idx = self.add_module(dependency);
            self.graph.update_edge(idx, dep_idx, ());
        }
        idx
    }

    /// Adds an edge between two existing modules.
    ///
    /// Creates an edge from `from` (the dependent) to `to` (the dependency).
    ///
    /// # Returns
    ///
    /// `true` if a new edge was added, `false` if either module doesn't
    /// exist or the edge was already present.
    ///
    /// # Example
    ///
    /// ```rust
    /// use addon_graph::graph::ModuleGraph;
    ///
    /// let mut graph = ModuleGraph::new();
    /// graph.add_module("sale");
    /// graph.add_module("base");
    ///
    /// assert!(graph.add_edge("sale", "base"));
    /// assert!(!graph.add_edge("sale", "base")); // already present
    /// assert!(!graph.add_edge("nonexistent", "base"));
    /// ```
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&from_idx), Some(&to_idx)) =
            (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return false;
        };

        if self.graph.contains_edge(from_idx, to_idx) {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, ());
        true
    }

    /// Gets a reference to a module node by name.
    pub fn get_node(&self, name: &str) -> Option<&ModuleNode> {
        self.node_indices
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Gets the modules a module depends on (outgoing edges).
    pub fn get_dependencies(&self, name: &str) -> Vec<&ModuleNode> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Gets the modules that depend on a module (incoming edges).
    pub fn get_dependents(&self, name: &str) -> Vec<&ModuleNode> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&ModuleNode> {
        let Some(&idx) = self.node_indices.get(name) else {
            return Vec::new();
        };

        self.graph
            .edges_directed(idx, direction)
            .filter_map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph.node_weight(other)
            })
            .collect()
    }

    /// Sorted names of the modules `name` depends on.
    pub fn dependency_names(&self, name: &str) -> Vec<String> {
        sorted_names(self.get_dependencies(name))
    }

    /// Sorted names of the modules that depend on `name`.
    pub fn dependent_names(&self, name: &str) -> Vec<String> {
        sorted_names(self.get_dependents(name))
    }

    /// Gets all nodes in insertion order.
    pub fn get_all_nodes(&self) -> Vec<&ModuleNode> {
        self.graph.node_weights().collect()
    }

    /// All module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        sorted_names(self.get_all_nodes())
    }

    /// Modules referenced as dependencies but never declared by a manifest.
    pub fn dangling_modules(&self) -> Vec<&ModuleNode> {
        self.graph
            .node_weights()
            .filter(|node| node.is_dangling())
            .collect()
    }

    /// All edges as `(dependent, dependency)` name pairs, in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].name.as_str(),
                    self.graph[edge.target()].name.as_str(),
                )
            })
            .collect()
    }

    /// The edge set as ordered owned pairs, convenient for comparisons.
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.edges()
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    /// Number of modules that depend directly on `name`.
    pub fn in_degree(&self, name: &str) -> usize {
        self.degree(name, Direction::Incoming)
    }

    /// Number of modules `name` depends on directly.
    pub fn out_degree(&self, name: &str) -> usize {
        self.degree(name, Direction::Outgoing)
    }

    fn degree(&self, name: &str, direction: Direction) -> usize {
        self.node_indices
            .get(name)
            .map_or(0, |&idx| self.graph.edges_directed(idx, direction).count())
    }

    /// The highest in-degree of any module, 0 for an empty graph.
    pub fn max_in_degree(&self) -> usize {
        self.graph
            .node_indices()
            .map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .max()
            .unwrap_or(0)
    }

    /// Computes summary counts for the graph.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            modules: self.graph.node_count(),
            dependencies: self.graph.edge_count(),
            ..GraphStats::default()
        };
        for idx in self.graph.node_indices() {
            if self.graph.edges_directed(idx, Direction::Outgoing).next().is_none() {
                stats.leaf_modules += 1;
            }
            if self.graph.edges_directed(idx, Direction::Incoming).next().is_none() {
                stats.base_modules += 1;
            }
        }
        stats
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Checks if a module exists in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }
}

fn sorted_names(nodes: Vec<&ModuleNode>) -> Vec<String> {
    let mut names: Vec<String> = nodes.into_iter().map(|n| n.name.clone()).collect();
    names.sort();
    names
}
