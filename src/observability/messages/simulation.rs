// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the evaluation orchestrator's state-machine
//! transitions: initialize, cycle detection, calculation, validation.

use std::fmt::{Display, Formatter};
use tracing::Span;

use super::StructuredLog;

/// Scenario overrides applied during `Initialize`.
pub struct OverridesApplied {
    pub applied: usize,
    pub skipped: usize,
}

impl Display for OverridesApplied {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "applied {} scenario override(s), skipped {}",
            self.applied, self.skipped
        )
    }
}

impl StructuredLog for OverridesApplied {
    fn log(&self) {
        tracing::info!(applied = self.applied, skipped = self.skipped, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("overrides_applied", span_name = name, applied = self.applied, skipped = self.skipped)
    }
}

/// A scenario override targeted an unknown or calculated attribute and was
/// ignored.
pub struct OverrideSkipped<'a> {
    pub attribute_id: &'a str,
    pub reason: &'a str,
}

impl Display for OverrideSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "ignoring override for '{}': {}", self.attribute_id, self.reason)
    }
}

impl StructuredLog for OverrideSkipped<'_> {
    fn log(&self) {
        tracing::warn!(attribute_id = self.attribute_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("override_skipped", span_name = name, attribute_id = self.attribute_id)
    }
}

/// `DetectCycles` found one or more cycles; the run will route through
/// `ResolveCycles` before calculating.
pub struct CyclesDetected {
    pub cycle_count: usize,
}

impl Display for CyclesDetected {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "detected {} cycle(s); routing through the iterative cycle solver", self.cycle_count)
    }
}

impl StructuredLog for CyclesDetected {
    fn log(&self) {
        tracing::info!(cycle_count = self.cycle_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("cycles_detected", span_name = name, cycle_count = self.cycle_count)
    }
}

/// `DetectCycles` found no cycles; the run proceeds directly to
/// topological calculation.
pub struct CyclesClear;

impl Display for CyclesClear {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "no cycles detected")
    }
}

impl StructuredLog for CyclesClear {
    fn log(&self) {
        tracing::info!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("cycles_clear", span_name = name)
    }
}

/// A calculated attribute's `calculate` raised; a kind-based default was
/// substituted.
pub struct CalculationSubstituted<'a> {
    pub attribute_id: &'a str,
    pub reason: &'a str,
    pub default: f64,
}

impl Display for CalculationSubstituted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "calculation for '{}' failed ({}), substituting default {}",
            self.attribute_id, self.reason, self.default
        )
    }
}

impl StructuredLog for CalculationSubstituted<'_> {
    fn log(&self) {
        tracing::warn!(
            attribute_id = self.attribute_id,
            reason = self.reason,
            default = self.default,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "calculation_substituted",
            span_name = name,
            attribute_id = self.attribute_id,
            default = self.default,
        )
    }
}

/// A calculated attribute was missing a dependency value; `0` was
/// substituted for that dependency.
pub struct MissingDependencySubstituted<'a> {
    pub attribute_id: &'a str,
    pub missing_dependency: &'a str,
}

impl Display for MissingDependencySubstituted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "'{}' is missing dependency '{}', substituting 0",
            self.attribute_id, self.missing_dependency
        )
    }
}

impl StructuredLog for MissingDependencySubstituted<'_> {
    fn log(&self) {
        tracing::warn!(
            attribute_id = self.attribute_id,
            missing_dependency = self.missing_dependency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "missing_dependency_substituted",
            span_name = name,
            attribute_id = self.attribute_id,
            missing_dependency = self.missing_dependency,
        )
    }
}

/// `Validate` found attributes whose final value is still null.
pub struct ValidationFailed<'a> {
    pub unresolved: &'a [String],
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "validation failed: unresolved attribute(s) {}", self.unresolved.join(", "))
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(unresolved_count = self.unresolved.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("validation_failed", span_name = name, unresolved_count = self.unresolved.len())
    }
}

/// A run completed (any terminal status) in the given duration.
pub struct RunCompleted<'a> {
    pub status: &'a str,
    pub duration: std::time::Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "run completed with status '{}' in {:?}", self.status, self.duration)
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(status = self.status, duration_ms = self.duration.as_millis() as u64, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("run_completed", span_name = name, status = self.status, duration = ?self.duration)
    }
}
