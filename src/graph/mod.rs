//! The attribute dependency graph: construction, cycle detection, and
//! topological ordering.
//!
//! Edges point **dependency → dependent**: `forward_edges[u]` contains `v`
//! iff `u` must be computed before `v`. `reverse_edges` is the transpose,
//! kept consistent by every mutator. In-degree — as used by
//! [`DependencyGraph::topological_sort`] — counts how many things a node
//! depends on (incoming forward edges), **not** how many things depend on
//! it; Kahn's algorithm here starts from nodes with zero dependencies.
//!
//! ```
//! use stk_simulate::graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_edge("a", "c"); // a is a dependency of c
//! graph.add_edge("b", "c"); // b is a dependency of c
//!
//! let order = graph.topological_sort().unwrap();
//! assert_eq!(order, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
//! ```

use std::collections::{HashMap, HashSet};

use crate::errors::CycleDetectedError;

/// Directed graph of attribute ids with edges `dependency → dependent`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashSet<String>,
    forward_edges: HashMap<String, Vec<String>>,
    reverse_edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: adding an already-present node is a no-op.
    pub fn add_node(&mut self, id: &str) {
        if self.nodes.insert(id.to_string()) {
            self.forward_edges.entry(id.to_string()).or_default();
            self.reverse_edges.entry(id.to_string()).or_default();
        }
    }

    /// Record that `dependent` needs `dependency` computed first. Both
    /// endpoints are auto-added as nodes. Idempotent: adding the same edge
    /// twice leaves the graph state unchanged.
    pub fn add_edge(&mut self, dependency: &str, dependent: &str) {
        self.add_node(dependency);
        self.add_node(dependent);

        let forward = self.forward_edges.entry(dependency.to_string()).or_default();
        if !forward.iter().any(|v| v == dependent) {
            forward.push(dependent.to_string());
        }
        let reverse = self.reverse_edges.entry(dependent.to_string()).or_default();
        if !reverse.iter().any(|v| v == dependency) {
            reverse.push(dependency.to_string());
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dependencies of `id` — nodes that must be computed before it.
    pub fn dependencies_of(&self, id: &str) -> &[String] {
        self.reverse_edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Dependents of `id` — nodes that need `id` computed first.
    pub fn dependents_of(&self, id: &str) -> &[String] {
        self.forward_edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn in_degrees(&self) -> HashMap<String, usize> {
        self.nodes
            .iter()
            .map(|id| (id.clone(), self.reverse_edges.get(id).map(Vec::len).unwrap_or(0)))
            .collect()
    }

    /// Kahn's algorithm. Ties among ready nodes are broken by id for
    /// deterministic, reproducible orderings given a fixed input.
    pub fn topological_sort(&self) -> Result<Vec<String>, CycleDetectedError> {
        let mut in_degree = self.in_degrees();
        let mut ready: std::collections::BTreeSet<String> = in_degree
            .iter()
            .filter(|(_, &count)| count == 0)
            .map(|(id, _)| id.clone())
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.iter().next().cloned() {
            ready.remove(&id);
            order.push(id.clone());
            for dependent in self.dependents_of(&id) {
                if let Some(count) = in_degree.get_mut(dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent.clone());
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(CycleDetectedError { cycles: self.find_cycles() })
        }
    }

    /// Every simple cycle reachable from some start node, each returned as
    /// an ordered path whose first and last elements are the same node.
    /// DFS with a recursion stack (3-color): unvisited, visiting, visited.
    /// A node already fully visited is never re-explored, so identical
    /// cycles are not double-reported across different DFS roots.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut state: HashMap<&str, DfsState> =
            self.nodes.iter().map(|n| (n.as_str(), DfsState::Unvisited)).collect();
        let mut path: Vec<String> = Vec::new();
        let mut cycles: Vec<Vec<String>> = Vec::new();

        let mut roots: Vec<&String> = self.nodes.iter().collect();
        roots.sort();

        for root in roots {
            if state[root.as_str()] == DfsState::Unvisited {
                self.dfs_find_cycles(root, &mut state, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn dfs_find_cycles<'a>(
        &'a self,
        node: &'a str,
        state: &mut HashMap<&'a str, DfsState>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        state.insert(node, DfsState::Visiting);
        path.push(node.to_string());

        for neighbor in self.dependents_of(node) {
            match state.get(neighbor.as_str()).copied().unwrap_or(DfsState::Unvisited) {
                DfsState::Unvisited => {
                    self.dfs_find_cycles(neighbor, state, path, cycles);
                }
                DfsState::Visiting => {
                    let start = path.iter().position(|n| n == neighbor).expect("node on recursion stack must be on path");
                    let mut cycle: Vec<String> = path[start..].to_vec();
                    cycle.push(neighbor.clone());
                    cycles.push(cycle);
                }
                DfsState::Visited => {}
            }
        }

        path.pop();
        state.insert(node, DfsState::Visited);
    }
}

#[derive(Clone, Copy, PartialEq)]
enum DfsState {
    Unvisited,
    Visiting,
    Visited,
}
