// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A scenario-driven attribute evaluation engine for a small industrial
//! digital twin domain: attributes grouped into blocks, a dependency graph
//! with cycle detection, an iterative cycle solver with oscillation
//! dampening, and an evaluation orchestrator that ties the two together.
//!
//! The entry point is [`simulation::Simulation`].

pub mod errors;
pub mod graph;
pub mod model;
pub mod observability;
pub mod orchestrator;
pub mod registry;
pub mod result;
pub mod scenario;
pub mod simulation;
pub mod solver;

pub use model::{Attribute, AttributeKind, Block, Calculate};
pub use result::{ResultRecord, SimulationStatus};
pub use simulation::Simulation;
