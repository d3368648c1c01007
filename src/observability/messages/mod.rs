// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `simulation` — orchestrator lifecycle events (initialize, detect
//!   cycles, calculate, validate)
//! * `solver` — iterative cycle solver events (seeding, per-iteration
//!   convergence checks, oscillation stabilization)
//!
//! # Example
//! ```
//! use stk_simulate::observability::messages::{StructuredLog, simulation::CyclesDetected};
//!
//! let msg = CyclesDetected { cycle_count: 2 };
//! msg.log();
//! ```

pub mod simulation;
pub mod solver;

use tracing::Span;

/// A loggable event with both a human-readable `Display` and structured
/// fields suitable for querying or span attributes.
pub trait StructuredLog: std::fmt::Display {
    /// Emit this event via `tracing`, at the level appropriate to its
    /// semantic meaning (info for lifecycle events, warn/error for
    /// failures).
    fn log(&self);

    /// An `info_span`/`error_span` carrying this event's fields as
    /// attributes.
    fn span(&self, name: &str) -> Span;
}
