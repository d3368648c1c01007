// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the evaluation engine.
//!
//! Most failures the engine encounters are non-fatal by design (see §7 of
//! the engine's error-handling policy): a missing dependency or a failing
//! `calculate` substitutes a default and the run continues. Only
//! [`ConfigurationError`] (construction time) and the terminal
//! [`crate::result::SimulationStatus`] variants stop a run.

use thiserror::Error;

/// Fatal at model-construction time: the model itself is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("duplicate attribute id: '{id}'")]
    DuplicateId { id: String },

    #[error("attribute '{id}' is Calculated but has no calculate function")]
    MissingCalculate { id: String },

    #[error("scenario override targets calculated attribute '{id}'; overrides only apply to Input attributes")]
    OverrideOfCalculated { id: String },
}

/// Raised internally by [`crate::graph::DependencyGraph::topological_sort`]
/// when the graph is not a DAG. The orchestrator never surfaces this to the
/// caller: it routes the affected cycles through the iterative cycle solver
/// instead (see [`crate::solver`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency graph contains {} cycle(s)", cycles.len())]
pub struct CycleDetectedError {
    pub cycles: Vec<Vec<String>>,
}

/// Non-fatal: a calculated attribute's `calculate` returned `Err`. The
/// orchestrator substitutes a kind-based default (see
/// [`crate::orchestrator::default_for_id`]) and continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("calculation failed for '{id}': {reason}")]
pub struct CalculationFailure {
    pub id: String,
    pub reason: String,
}

/// Terminal: some attribute's final value is still `None` after a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: unresolved attribute(s) {}", ids.join(", "))]
pub struct ValidationFailure {
    pub ids: Vec<String>,
}
