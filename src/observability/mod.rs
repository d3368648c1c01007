// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the evaluation engine, organized by subsystem.
//!
//! Every event type implements [`messages::StructuredLog`]: `Display` for a
//! human-readable message, `log()` for structured fields via `tracing`.

pub mod messages;
