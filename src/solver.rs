//! The iterative cycle solver (C6) and the pre/post cycle partitioner (C8).
//!
//! A cycle is solved in four steps: compute its non-cyclic ancestors first
//! (§4.4 Step 1, delegated to [`crate::orchestrator::evaluate_pass`] over a
//! reduced graph that has had every edge internal to a cycle cut), seed
//! every cyclic attribute that is still null (Step 2), run a bounded
//! Gauss–Seidel fixed-point iteration with convergence and oscillation
//! tests (Step 3), then let the same reduced-graph pass pick up the
//! non-cyclic descendants afterward (Step 4).

use std::collections::{HashMap, HashSet};

use crate::graph::DependencyGraph;
use crate::observability::messages::{solver::*, StructuredLog};
use crate::simulation::Simulation;

pub const MAX_ITERATIONS: usize = 10;
pub const CONVERGENCE_THRESHOLD: f64 = 0.05;
const OSCILLATION_THRESHOLD: f64 = 0.1;
const OSCILLATION_WINDOW: usize = 4;

/// How a cycle's fixed-point iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Converged { iterations: usize },
    Oscillated { iterations: usize },
    Exhausted,
}

/// The ordered, deduplicated members of a cycle as returned by
/// [`DependencyGraph::find_cycles`] (which closes the path by repeating the
/// start node at the end).
pub fn cycle_members(cycle_path: &[String]) -> Vec<String> {
    match (cycle_path.first(), cycle_path.last()) {
        (Some(first), Some(last)) if cycle_path.len() > 1 && first == last => {
            cycle_path[..cycle_path.len() - 1].to_vec()
        }
        _ => cycle_path.to_vec(),
    }
}

/// A copy of `graph` with every edge whose two endpoints are both in `cut`
/// removed. Used to make a graph containing cycles safe to topologically
/// sort: once every edge internal to a cycle is gone, the remaining
/// structure (ancestors, the cycle's member nodes themselves, and
/// descendants) is acyclic as long as the cut set covers every detected
/// cycle's membership.
pub fn reduced_graph(graph: &DependencyGraph, cut: &HashSet<String>) -> DependencyGraph {
    let mut reduced = DependencyGraph::new();
    for node in graph.nodes() {
        reduced.add_node(node);
    }
    for node in graph.nodes() {
        for dependent in graph.dependents_of(node) {
            if cut.contains(node) && cut.contains(dependent) {
                continue;
            }
            reduced.add_edge(node, dependent);
        }
    }
    reduced
}

fn seed_for(id: &str) -> f64 {
    let lower = id.to_ascii_lowercase();
    if lower.contains("selling_price") {
        50.0
    } else if lower.contains("market_demand") {
        1000.0
    } else {
        100.0
    }
}

fn relative_change(new_value: f64, previous: f64) -> f64 {
    (new_value - previous).abs() / previous.abs().max(1e-6)
}

/// Seed every still-null member of `cycle`, then run the bounded
/// Gauss–Seidel fixed-point loop (§4.4 Steps 2–3). Assumes the non-cyclic
/// ancestor pass (Step 1) has already populated everything the cycle's
/// members can legitimately see before their first iteration.
pub fn solve_cycle(sim: &mut Simulation, cycle: &[String]) -> CycleOutcome {
    for id in cycle {
        let needs_seed = sim.attribute(id).map(|a| a.value.is_none()).unwrap_or(false);
        if needs_seed {
            let seed = seed_for(id);
            sim.set_value(id, seed);
            AttributeSeeded { attribute_id: id, seed }.log();
        }
    }

    let mut history: HashMap<String, Vec<f64>> = cycle.iter().map(|id| (id.clone(), Vec::new())).collect();

    for iteration in 1..=MAX_ITERATIONS {
        let mut max_relative_change: f64 = 0.0;

        for id in cycle {
            let context = sim.snapshot();
            let previous = context.get(id).copied().unwrap_or(0.0);
            let new_value = match sim.run_calculate(id, &context) {
                Some(Ok(value)) => value,
                Some(Err(reason)) => {
                    let default = crate::orchestrator::default_for_id(id);
                    crate::observability::messages::simulation::CalculationSubstituted {
                        attribute_id: id,
                        reason: &reason,
                        default,
                    }
                    .log();
                    default
                }
                None => previous,
            };

            history.get_mut(id).expect("cycle member").push(new_value);
            max_relative_change = max_relative_change.max(relative_change(new_value, previous));
            sim.set_value(id, new_value);
        }

        IterationCompleted { cycle, iteration, max_relative_change }.log();

        if max_relative_change <= CONVERGENCE_THRESHOLD {
            ConvergenceReached { cycle, iterations: iteration }.log();
            return CycleOutcome::Converged { iterations: iteration };
        }

        if iteration >= OSCILLATION_WINDOW && detect_oscillation(&history, cycle) {
            stabilize(sim, &history, cycle);
            OscillationStabilized { cycle, iterations: iteration }.log();
            return CycleOutcome::Oscillated { iterations: iteration };
        }
    }

    IterationsExhausted { cycle, max_iterations: MAX_ITERATIONS }.log();
    CycleOutcome::Exhausted
}

fn detect_oscillation(history: &HashMap<String, Vec<f64>>, cycle: &[String]) -> bool {
    cycle.iter().any(|id| {
        let h = &history[id];
        if h.len() < OSCILLATION_WINDOW {
            return false;
        }
        let n = h.len();
        (h[n - 1] - h[n - 3]).abs() < OSCILLATION_THRESHOLD && (h[n - 2] - h[n - 4]).abs() < OSCILLATION_THRESHOLD
    })
}

fn stabilize(sim: &mut Simulation, history: &HashMap<String, Vec<f64>>, cycle: &[String]) {
    for id in cycle {
        let h = &history[id];
        let window = &h[h.len().saturating_sub(OSCILLATION_WINDOW)..];
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let rounded = (mean * 100.0).round() / 100.0;
        sim.set_value(id, rounded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_members_strips_the_closing_duplicate() {
        let path = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(cycle_members(&path), vec!["a", "b"]);
    }

    #[test]
    fn seed_for_recognizes_known_substrings() {
        assert_eq!(seed_for("selling_price"), 50.0);
        assert_eq!(seed_for("market_demand"), 1000.0);
        assert_eq!(seed_for("widget_count"), 100.0);
    }

    #[test]
    fn relative_change_guards_against_division_by_zero() {
        assert!((relative_change(1.0, 0.0) - 1e6).abs() < 1.0);
    }

    #[test]
    fn reduced_graph_drops_only_internal_cycle_edges() {
        let mut g = DependencyGraph::new();
        g.add_edge("ancestor", "price");
        g.add_edge("price", "demand");
        g.add_edge("demand", "price");
        g.add_edge("demand", "descendant");

        let mut cut = HashSet::new();
        cut.insert("price".to_string());
        cut.insert("demand".to_string());

        let reduced = reduced_graph(&g, &cut);
        assert!(reduced.topological_sort().is_ok());
        assert_eq!(reduced.dependents_of("ancestor"), ["price"]);
        assert_eq!(reduced.dependents_of("demand"), ["descendant"]);
        assert!(reduced.dependents_of("price").is_empty());
    }

    #[test]
    fn detect_oscillation_requires_both_alternating_pairs_within_threshold() {
        let mut history = HashMap::new();
        history.insert("a".to_string(), vec![10.0, 20.0, 10.01, 20.02]);
        let cycle = vec!["a".to_string()];
        assert!(detect_oscillation(&history, &cycle));
    }

    #[test]
    fn detect_oscillation_is_false_when_values_are_still_moving() {
        let mut history = HashMap::new();
        history.insert("a".to_string(), vec![10.0, 12.0, 14.0, 16.0]);
        let cycle = vec!["a".to_string()];
        assert!(!detect_oscillation(&history, &cycle));
    }

    #[test]
    fn detect_oscillation_fires_when_only_one_member_of_a_cycle_alternates() {
        // "b" and "c" are still converging while "a" has settled into a
        // steady back-and-forth; oscillation is an exists-condition over
        // the cycle's members, not a for-all, so this must still trip.
        let mut history = HashMap::new();
        history.insert("a".to_string(), vec![10.0, 20.0, 10.01, 20.02]);
        history.insert("b".to_string(), vec![1.0, 2.0, 3.0, 4.0]);
        history.insert("c".to_string(), vec![100.0, 90.0, 80.0, 70.0]);
        let cycle = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(detect_oscillation(&history, &cycle));
    }
}
