//! The evaluation orchestrator (C7): a small state machine that
//! initializes inputs, detects cycles, resolves them iteratively, computes
//! the rest in topological order, and validates the result.
//!
//! ```text
//! Start -> Initialize -> DetectCycles -> { CyclesClear -> Calculate
//!                                        | CyclesDetected -> ResolveCycles -> Calculate }
//!       -> Validate -> End
//! ```

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::observability::messages::{simulation::*, StructuredLog};
use crate::result::{MetricValue, ResultRecord, SimulationStatus};
use crate::simulation::Simulation;
use crate::solver::{self, CycleOutcome};

/// Kind-based default substituted when a `calculate` fails, recognized by
/// case-insensitive id substring. These are not business-meaningful; they
/// exist only so downstream calculations still receive a number.
pub fn default_for_id(id: &str) -> f64 {
    let lower = id.to_ascii_lowercase();
    if lower.contains("price") {
        50.0
    } else if lower.contains("demand") {
        1000.0
    } else if lower.contains("margin") {
        20.0
    } else {
        0.0
    }
}

/// The orchestrator's explicit states, in transition order. `Calculate` and
/// `Validate` carry the running `cycles_resolved` count forward since it
/// ends up on the [`ResultRecord`] regardless of which branch produced it.
enum State {
    Initialize,
    DetectCycles,
    ResolveCycles { cycles: Vec<Vec<String>> },
    Calculate { cycles_resolved: usize },
    Validate { cycles_resolved: usize },
}

/// Drive a [`Simulation`] through the full state machine and produce its
/// [`ResultRecord`]. This is the implementation behind
/// [`Simulation::run`](crate::simulation::Simulation::run).
pub fn run(sim: &mut Simulation) -> ResultRecord {
    let started = Instant::now();
    let mut state = State::Initialize;
    let mut substitutions = 0usize;
    let mut missing_dependency_substitutions = 0usize;

    loop {
        state = match state {
            State::Initialize => {
                initialize(sim);
                State::DetectCycles
            }
            State::DetectCycles => {
                let cycles = sim.graph().find_cycles();
                if cycles.is_empty() {
                    CyclesClear.log();
                    State::Calculate { cycles_resolved: 0 }
                } else {
                    CyclesDetected { cycle_count: cycles.len() }.log();
                    State::ResolveCycles { cycles }
                }
            }
            State::ResolveCycles { cycles } => {
                let cycles_resolved = cycles.len();
                resolve_cycles(sim, &cycles, &mut substitutions, &mut missing_dependency_substitutions);
                State::Calculate { cycles_resolved }
            }
            State::Calculate { cycles_resolved } => {
                if cycles_resolved > 0 {
                    // The cycle resolution pass (pre-cycle ancestors, the
                    // solver itself, and the post-cycle descendant pass)
                    // already wrote every reachable attribute's value;
                    // harvest whatever is non-null.
                } else {
                    calculate_acyclic(sim, &mut substitutions, &mut missing_dependency_substitutions);
                }
                State::Validate { cycles_resolved }
            }
            State::Validate { cycles_resolved } => {
                let record = validate(sim, cycles_resolved, substitutions, missing_dependency_substitutions, started.elapsed());
                RunCompleted { status: &record.status.to_string(), duration: record.execution_time }.log();
                return record;
            }
        };
    }
}

fn initialize(sim: &mut Simulation) {
    let overrides: Vec<(String, f64)> = sim.overrides().iter().map(|(k, v)| (k.clone(), *v)).collect();
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for (id, value) in overrides {
        match sim.attribute(&id) {
            None => {
                OverrideSkipped { attribute_id: &id, reason: "unknown attribute id" }.log();
                skipped += 1;
            }
            Some(attr) if attr.is_calculated() => {
                OverrideSkipped { attribute_id: &id, reason: "targets a calculated attribute" }.log();
                skipped += 1;
            }
            Some(_) => {
                sim.set_value(&id, value);
                applied += 1;
            }
        }
    }

    OverridesApplied { applied, skipped }.log();
}

/// Evaluate every id in `order` that is not in `skip`, recomputing each
/// Calculated attribute whose value is still null and whose dependencies
/// are all currently satisfied. Inputs and already-computed attributes are
/// left untouched ("pass through unchanged"). Unsatisfied attributes are
/// left for a later pass (used by the cycle solver to implement its
/// pre/post partitioning as two calls to this same function).
pub fn evaluate_pass(
    sim: &mut Simulation,
    order: &[String],
    skip: &HashSet<String>,
    substitutions: &mut usize,
    missing_dependency_substitutions: &mut usize,
) {
    for id in order {
        if skip.contains(id) {
            continue;
        }
        let Some(attr) = sim.attribute(id) else { continue };
        if attr.value.is_some() || attr.is_input() {
            continue;
        }

        let satisfied = attr
            .dependencies
            .iter()
            .all(|dep| sim.attribute(dep).map(|d| d.value.is_some()).unwrap_or(true));
        if !satisfied {
            continue;
        }

        let context = dependency_context(sim, id, missing_dependency_substitutions);
        match sim.run_calculate(id, &context) {
            Some(Ok(value)) => sim.set_value(id, value),
            Some(Err(reason)) => {
                let default = default_for_id(id);
                CalculationSubstituted { attribute_id: id, reason: &reason, default }.log();
                sim.set_value(id, default);
                *substitutions += 1;
            }
            None => {}
        }
    }
}

/// Build the dependency-value map for `id`'s declared dependencies only
/// (as opposed to the solver's full-model snapshot): missing values
/// (unregistered or still-null dependencies) are substituted with `0`.
fn dependency_context(sim: &Simulation, id: &str, missing_dependency_substitutions: &mut usize) -> HashMap<String, f64> {
    let Some(attr) = sim.attribute(id) else { return HashMap::new() };
    let mut context = HashMap::new();
    for dep in &attr.dependencies {
        let value = sim.attribute(dep).and_then(|d| d.value);
        match value {
            Some(v) => {
                context.insert(dep.clone(), v);
            }
            None => {
                MissingDependencySubstituted { attribute_id: id, missing_dependency: dep }.log();
                context.insert(dep.clone(), 0.0);
                *missing_dependency_substitutions += 1;
            }
        }
    }
    context
}

fn calculate_acyclic(sim: &mut Simulation, substitutions: &mut usize, missing_dependency_substitutions: &mut usize) {
    let order = match sim.graph().topological_sort() {
        Ok(order) => order,
        Err(_) => return, // DetectCycles already guarantees this branch is acyclic
    };
    evaluate_pass(sim, &order, &HashSet::new(), substitutions, missing_dependency_substitutions);
}

fn resolve_cycles(
    sim: &mut Simulation,
    cycles: &[Vec<String>],
    substitutions: &mut usize,
    missing_dependency_substitutions: &mut usize,
) {
    let members: Vec<Vec<String>> = cycles.iter().map(|c| solver::cycle_members(c)).collect();
    let all_members: HashSet<String> = members.iter().flatten().cloned().collect();
    let reduced = solver::reduced_graph(sim.graph(), &all_members);
    let order = reduced
        .topological_sort()
        .expect("cutting every edge internal to a detected cycle must yield a DAG");

    // Step 1: every non-cyclic ancestor, for every cycle at once.
    evaluate_pass(sim, &order, &all_members, substitutions, missing_dependency_substitutions);

    // Steps 2-3: seed and iterate each cycle.
    for cycle in &members {
        solver::solve_cycle(sim, cycle);
    }

    // Step 4: non-cyclic descendants (and their own descendants), now that
    // every cycle member has a final value.
    evaluate_pass(sim, &order, &all_members, substitutions, missing_dependency_substitutions);
}

fn validate(
    sim: &Simulation,
    cycles_resolved: usize,
    substitutions: usize,
    missing_dependency_substitutions: usize,
    execution_time: std::time::Duration,
) -> ResultRecord {
    let snapshot = sim.snapshot();
    let all_ids = sim.attribute_ids();
    let unresolved: Vec<String> = all_ids.iter().filter(|id| !snapshot.contains_key(*id)).cloned().collect();

    let mut metrics = HashMap::new();
    metrics.insert("total_attributes".to_string(), MetricValue::from(all_ids.len()));
    metrics.insert("successful_calculations".to_string(), MetricValue::from(snapshot.len()));
    metrics.insert("calculation_substitutions".to_string(), MetricValue::from(substitutions));
    metrics.insert("missing_dependency_substitutions".to_string(), MetricValue::from(missing_dependency_substitutions));
    metrics.insert(
        "validation_timestamp".to_string(),
        MetricValue::from(std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)),
    );

    let (status, error_message) = if unresolved.is_empty() {
        (SimulationStatus::Completed, None)
    } else {
        ValidationFailed { unresolved: &unresolved }.log();
        (SimulationStatus::ValidationFailed, Some(format!("unresolved attribute(s): {}", unresolved.join(", "))))
    };

    ResultRecord {
        simulation_id: sim.id.clone(),
        status,
        execution_time,
        calculated_values: snapshot,
        cycles_resolved,
        metrics,
        error_message,
    }
}
