//! Circular dependency detection.

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::ModuleGraph;

/// Information about a detected circular dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleInfo {
    /// The modules of one elementary cycle in dependency order, starting
    /// at its alphabetically first module (the last depends on the first)
    pub nodes: Vec<String>,
    /// Every module in the strongly connected component, sorted
    pub members: Vec<String>,
}

impl CycleInfo {
    /// Returns a formatted string representation of the cycle path.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        let Some(first) = self.nodes.first() else {
            return String::new();
        };
        format!("{} -> {}", self.nodes.join(" -> "), first)
    }

    /// Returns the number of modules on the cycle path.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the cycle is empty (should not happen in practice).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl ModuleGraph {
    /// Checks if the graph contains cycles.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Detects circular dependencies.
    ///
    /// Every elementary cycle yields one [`CycleInfo`]: a closed path that
    /// visits each of its modules once, starting at its alphabetically
    /// first module. `members` holds the whole strongly connected component
    /// the cycle lies in. Results are sorted by path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use addon_graph::graph::ModuleGraph;
    /// use addon_graph::parser::Manifest;
    ///
    /// let graph = ModuleGraph::from_manifests(vec![
    ///     Manifest::new("a", ["b"]),
    ///     Manifest::new("b", ["c"]),
    ///     Manifest::new("c", ["a"]),
    /// ]);
    ///
    /// let cycles = graph.detect_cycles();
    /// assert_eq!(cycles.len(), 1);
    /// assert_eq!(cycles[0].cycle_path(), "a -> b -> c -> a");
    /// ```
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&self.graph) {
            let is_cycle = match scc.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            };
            if !is_cycle {
                continue;
            }

            let mut members: Vec<String> =
                scc.iter().map(|&idx| self.graph[idx].name.clone()).collect();
            members.sort();

            for path in self.elementary_cycles(&scc) {
                cycles.push(CycleInfo {
                    nodes: path
                        .into_iter()
                        .map(|idx| self.graph[idx].name.clone())
                        .collect(),
                    members: members.clone(),
                });
            }
        }

        cycles.sort_by(|a, b| a.nodes.cmp(&b.nodes));
        cycles
    }

    /// Returns the set of module names that are part of any cycle.
    pub fn get_nodes_in_cycles(&self) -> HashSet<String> {
        self.detect_cycles()
            .into_iter()
            .flat_map(|cycle| cycle.members)
            .collect()
    }

    /// Enumerates the elementary cycles of one strongly connected
    /// component.
    ///
    /// Members are ranked by name. Each cycle is found once, from its
    /// lowest-ranked member, by a backtracking walk restricted to members
    /// ranked at or above that start.
    fn elementary_cycles(&self, component: &[NodeIndex]) -> Vec<Vec<NodeIndex>> {
        let mut order = component.to_vec();
        order.sort_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name));
        let rank: HashMap<NodeIndex, usize> =
            order.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();

        let mut cycles = Vec::new();
        for (start_rank, &start) in order.iter().enumerate() {
            let mut walk = CycleWalk {
                start,
                start_rank,
                rank: &rank,
                path: vec![start],
                on_path: HashSet::from([start]),
            };
            self.extend_cycles(&mut walk, &mut cycles);
        }
        cycles
    }

    fn extend_cycles(&self, walk: &mut CycleWalk<'_>, cycles: &mut Vec<Vec<NodeIndex>>) {
        let Some(&current) = walk.path.last() else {
            return;
        };

        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors(current)
            .filter(|n| walk.rank.get(n).is_some_and(|&r| r >= walk.start_rank))
            .collect();
        next.sort_by_key(|n| walk.rank[n]);
        next.dedup();

        for neighbor in next {
            if neighbor == walk.start {
                cycles.push(walk.path.clone());
            } else if walk.on_path.insert(neighbor) {
                walk.path.push(neighbor);
                self.extend_cycles(walk, cycles);
                walk.path.pop();
                walk.on_path.remove(&neighbor);
            }
        }
    }
}

/// Backtracking state while searching cycles from one start module.
struct CycleWalk<'a> {
    start: NodeIndex,
    start_rank: usize,
    rank: &'a HashMap<NodeIndex, usize>,
    path: Vec<NodeIndex>,
    on_path: HashSet<NodeIndex>,
}
