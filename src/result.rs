//! The [`ResultRecord`] returned from a run: status, calculated values,
//! timing, metrics, and (on failure) an error message.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    Completed,
    CyclesResolved,
    CalculationFailed,
    ValidationFailed,
    Failed,
}

impl std::fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SimulationStatus::Completed => "completed",
            SimulationStatus::CyclesResolved => "cycles_resolved",
            SimulationStatus::CalculationFailed => "calculation_failed",
            SimulationStatus::ValidationFailed => "validation_failed",
            SimulationStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

fn serialize_duration_as_seconds<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// An opaque metric value: the `metrics` map holds a mix of integers,
/// floats, and timestamps, matching §6's `mapping<string, Any>`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Integer(v as i64)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// The outcome of a single [`crate::simulation::Simulation::run`] call.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub simulation_id: String,
    pub status: SimulationStatus,
    #[serde(serialize_with = "serialize_duration_as_seconds")]
    pub execution_time: Duration,
    pub calculated_values: HashMap<String, f64>,
    /// Count of cycles detected by [`crate::graph::DependencyGraph::find_cycles`]
    /// before resolution began. Per the source this engine is modeled on,
    /// this is a pre-resolution snapshot, not a count of cycles the solver
    /// successfully resolved (see DESIGN.md, Open Question 3).
    pub cycles_resolved: usize,
    pub metrics: HashMap<String, MetricValue>,
    pub error_message: Option<String>,
}

impl ResultRecord {
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            SimulationStatus::Completed | SimulationStatus::CyclesResolved
        )
    }
}
