// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the iterative cycle solver: seeding, per-iteration
//! convergence checks, oscillation stabilization, and exhaustion.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

/// A cyclic attribute had no current value; a seed constant was assigned
/// to bootstrap the iteration.
pub struct AttributeSeeded<'a> {
    pub attribute_id: &'a str,
    pub seed: f64,
}

impl Display for AttributeSeeded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "seeded '{}' with {}", self.attribute_id, self.seed)
    }
}

impl StructuredLog for AttributeSeeded<'_> {
    fn log(&self) {
        tracing::debug!(attribute_id = self.attribute_id, seed = self.seed, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("attribute_seeded", span_name = name, attribute_id = self.attribute_id, seed = self.seed)
    }
}

/// One iteration of the fixed-point loop completed for a cycle.
pub struct IterationCompleted<'a> {
    pub cycle: &'a [String],
    pub iteration: usize,
    pub max_relative_change: f64,
}

impl Display for IterationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "cycle [{}] iteration {} max relative change {:.4}",
            self.cycle.join(", "),
            self.iteration,
            self.max_relative_change
        )
    }
}

impl StructuredLog for IterationCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            iteration = self.iteration,
            max_relative_change = self.max_relative_change,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "iteration_completed",
            span_name = name,
            iteration = self.iteration,
            max_relative_change = self.max_relative_change,
        )
    }
}

/// The cycle converged: every member's relative change fell within the
/// threshold.
pub struct ConvergenceReached<'a> {
    pub cycle: &'a [String],
    pub iterations: usize,
}

impl Display for ConvergenceReached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "cycle [{}] converged after {} iteration(s)",
            self.cycle.join(", "),
            self.iterations
        )
    }
}

impl StructuredLog for ConvergenceReached<'_> {
    fn log(&self) {
        tracing::info!(iterations = self.iterations, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("convergence_reached", span_name = name, iterations = self.iterations)
    }
}

/// The cycle oscillated; values were stabilized to the mean of recent
/// history rather than allowed to diverge or exhaust the iteration budget.
pub struct OscillationStabilized<'a> {
    pub cycle: &'a [String],
    pub iterations: usize,
}

impl Display for OscillationStabilized<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "cycle [{}] oscillated at iteration {}; stabilized to recent mean",
            self.cycle.join(", "),
            self.iterations
        )
    }
}

impl StructuredLog for OscillationStabilized<'_> {
    fn log(&self) {
        tracing::warn!(iterations = self.iterations, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("oscillation_stabilized", span_name = name, iterations = self.iterations)
    }
}

/// Neither convergence nor oscillation tripped within `MAX_ITERATIONS`; the
/// last computed values were accepted without further iteration.
pub struct IterationsExhausted<'a> {
    pub cycle: &'a [String],
    pub max_iterations: usize,
}

impl Display for IterationsExhausted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "cycle [{}] did not converge within {} iterations; accepting last computed values",
            self.cycle.join(", "),
            self.max_iterations
        )
    }
}

impl StructuredLog for IterationsExhausted<'_> {
    fn log(&self) {
        tracing::warn!(max_iterations = self.max_iterations, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("iterations_exhausted", span_name = name, max_iterations = self.max_iterations)
    }
}
