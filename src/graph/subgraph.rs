//! Reachability-based subgraph extraction.
//!
//! Both extractors run a single breadth-first traversal from the root and
//! return the subgraph induced by the visited modules.

use petgraph::graph::NodeIndex;
use petgraph::visit::{Bfs, Reversed};
use std::collections::HashSet;
use tracing::warn;

use super::ModuleGraph;

impl ModuleGraph {
    /// Returns the root and every module that depends on it, directly or
    /// transitively, as an induced subgraph.
    ///
    /// These are the modules that would break if `root` were removed. An
    /// unknown root yields an empty graph.
    ///
    /// # Example
    ///
    /// ```rust
    /// use addon_graph::graph::ModuleGraph;
    /// use addon_graph::parser::Manifest;
    ///
    /// let graph = ModuleGraph::from_manifests(vec![
    ///     Manifest::new("sale", ["account"]),
    ///     Manifest::new("account", ["base"]),
    ///     Manifest::new("website", ["base"]),
    /// ]);
    ///
    /// let dependents = graph.dependents_subgraph("account");
    /// assert_eq!(dependents.module_names(), vec!["account", "sale"]);
    /// ```
    pub fn dependents_subgraph(&self, root: &str) -> ModuleGraph {
        match self.node_indices.get(root) {
            Some(&start) => {
                let reversed = Reversed(&self.graph);
                let mut visited = HashSet::new();
                let mut bfs = Bfs::new(reversed, start);
                while let Some(idx) = bfs.next(reversed) {
                    visited.insert(idx);
                }
                self.induced_subgraph(&visited)
            }
            None => {
                warn!("Module '{}' not found in the dependency graph.", root);
                ModuleGraph::new()
            }
        }
    }

    /// Returns the root and every module it depends on, directly or
    /// transitively, as an induced subgraph.
    ///
    /// An unknown root yields an empty graph.
    ///
    /// # Example
    ///
    /// ```rust
    /// use addon_graph::graph::ModuleGraph;
    /// use addon_graph::parser::Manifest;
    ///
    /// let graph = ModuleGraph::from_manifests(vec![
    ///     Manifest::new("sale", ["account"]),
    ///     Manifest::new("account", ["base"]),
    /// ]);
    ///
    /// let deps = graph.dependencies_subgraph("account");
    /// assert_eq!(deps.module_names(), vec!["account", "base"]);
    /// assert!(graph.dependencies_subgraph("unknown").is_empty());
    /// ```
    pub fn dependencies_subgraph(&self, root: &str) -> ModuleGraph {
        match self.node_indices.get(root) {
            Some(&start) => {
                let mut visited = HashSet::new();
                let mut bfs = Bfs::new(&self.graph, start);
                while let Some(idx) = bfs.next(&self.graph) {
                    visited.insert(idx);
                }
                self.induced_subgraph(&visited)
            }
            None => {
                warn!("Module '{}' not found in the dependency graph.", root);
                ModuleGraph::new()
            }
        }
    }

    /// Restricts the graph to `keep`, retaining every edge whose endpoints
    /// both survive. Node order follows the parent graph.
    fn induced_subgraph(&self, keep: &HashSet<NodeIndex>) -> ModuleGraph {
        let inner = self.graph.filter_map(
            |idx, node| keep.contains(&idx).then(|| node.clone()),
            |_, edge| Some(*edge),
        );
        ModuleGraph::from_inner(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Manifest;
    use proptest::prelude::*;

    fn leaf(name: &str) -> Manifest {
        Manifest::new(name, Vec::<&str>::new())
    }

    fn odoo_like() -> ModuleGraph {
        ModuleGraph::from_manifests(vec![
            Manifest::new("sale_management", ["sale", "digest"]),
            Manifest::new("sale", ["sales_team", "account", "utm"]),
            Manifest::new("account", ["base", "mail"]),
            Manifest::new("mail", ["base", "web"]),
            Manifest::new("web", ["base"]),
            Manifest::new("website", ["web"]),
            leaf("base"),
        ])
    }

    #[test]
    fn test_two_module_example() {
        let graph = ModuleGraph::from_manifests(vec![Manifest::new("a", ["b"]), leaf("b")]);

        assert_eq!(graph.dependents_subgraph("b").module_names(), vec!["a", "b"]);
        assert_eq!(graph.dependencies_subgraph("a").module_names(), vec!["a", "b"]);
        assert_eq!(graph.dependencies_subgraph("b").module_names(), vec!["b"]);
    }

    #[test]
    fn test_dependencies_subgraph_transitive() {
        let graph = odoo_like();
        let deps = graph.dependencies_subgraph("account");

        assert_eq!(deps.module_names(), vec!["account", "base", "mail", "web"]);
        assert_eq!(
            deps.edge_set(),
            [
                ("account", "base"),
                ("account", "mail"),
                ("mail", "base"),
                ("mail", "web"),
                ("web", "base"),
            ]
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
        );
    }

    #[test]
    fn test_dependents_subgraph_transitive() {
        let graph = odoo_like();
        let dependents = graph.dependents_subgraph("web");

        assert_eq!(
            dependents.module_names(),
            vec!["account", "mail", "sale", "sale_management", "web", "website"]
        );
        // induced: base is not part of it, so no edge into base survives
        assert!(dependents.edges().iter().all(|(_, to)| *to != "base"));
        assert!(dependents.contains("website"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let graph = odoo_like();

        assert!(graph.dependents_subgraph("stock").is_empty());
        assert!(graph.dependencies_subgraph("stock").is_empty());
    }

    #[test]
    fn test_subgraph_keeps_metadata() {
        let graph = odoo_like();
        let deps = graph.dependencies_subgraph("sale");

        assert!(deps.get_node("sale").unwrap().defined);
        assert!(deps.get_node("utm").unwrap().is_dangling());
    }

    #[test]
    fn test_subgraph_with_cycle() {
        let graph = ModuleGraph::from_manifests(vec![
            Manifest::new("a", ["b"]),
            Manifest::new("b", ["c"]),
            Manifest::new("c", ["a"]),
            Manifest::new("d", ["a"]),
        ]);

        assert_eq!(graph.dependencies_subgraph("b").module_names(), vec!["a", "b", "c"]);
        assert_eq!(
            graph.dependents_subgraph("b").module_names(),
            vec!["a", "b", "c", "d"]
        );
    }

    /// Strategy producing manifests over a small alphabet of module names.
    fn arb_manifests() -> impl Strategy<Value = Vec<Manifest>> {
        let name = prop::sample::select(vec!["a", "b", "c", "d", "e", "f", "g", "h"]);
        prop::collection::vec(
            (name.clone(), prop::collection::vec(name, 0..4)),
            0..10,
        )
        .prop_map(|entries| {
            entries
                .into_iter()
                .map(|(module, deps)| Manifest::new(module, deps))
                .collect()
        })
    }

    /// Naive reachability used as an oracle for the traversal results.
    fn has_path(graph: &ModuleGraph, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![from.to_string()];
        while let Some(current) = stack.pop() {
            for next in graph.dependency_names(&current) {
                if next == to {
                    return true;
                }
                if seen.insert(next.clone()) {
                    stack.push(next);
                }
            }
        }
        false
    }

    proptest! {
        #[test]
        fn dependents_contain_root(manifests in arb_manifests(), root in "[a-h]") {
            let graph = ModuleGraph::from_manifests(manifests);
            let dependents = graph.dependents_subgraph(&root);
            prop_assert_eq!(dependents.contains(&root), graph.contains(&root));
        }

        #[test]
        fn subgraphs_match_reachability(manifests in arb_manifests(), root in "[a-h]") {
            let graph = ModuleGraph::from_manifests(manifests);
            prop_assume!(graph.contains(&root));

            let deps = graph.dependencies_subgraph(&root);
            let dependents = graph.dependents_subgraph(&root);

            for name in graph.module_names() {
                prop_assert_eq!(deps.contains(&name), has_path(&graph, &root, &name));
                prop_assert_eq!(dependents.contains(&name), has_path(&graph, &name, &root));
            }
        }

        #[test]
        fn subgraph_edges_are_induced(manifests in arb_manifests(), root in "[a-h]") {
            let graph = ModuleGraph::from_manifests(manifests);
            let deps = graph.dependencies_subgraph(&root);

            let expected: std::collections::BTreeSet<_> = graph
                .edge_set()
                .into_iter()
                .filter(|(from, to)| deps.contains(from) && deps.contains(to))
                .collect();
            prop_assert_eq!(deps.edge_set(), expected);
        }

        #[test]
        fn rebuild_is_deterministic(manifests in arb_manifests()) {
            let first = ModuleGraph::from_manifests(manifests.clone());
            let second = ModuleGraph::from_manifests(manifests);
            prop_assert_eq!(first.edge_set(), second.edge_set());
        }
    }
}
