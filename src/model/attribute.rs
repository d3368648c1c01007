use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Opaque metadata carried alongside an attribute and handed, unexamined, to
/// its `calculate` function. The engine never inspects these values.
pub type Metadata = HashMap<String, serde_json::Value>;

/// A user-supplied pure function computing an attribute's value from its
/// dependencies' current values and the attribute's own metadata.
///
/// Returning `Err` is the Rust expression of "the source function raised":
/// the orchestrator catches it, substitutes a kind-based default, logs a
/// [`crate::errors::CalculationFailure`], and continues the run (see
/// [`crate::orchestrator`]).
pub type Calculate = Box<dyn Fn(&HashMap<String, f64>, &Metadata) -> Result<f64, String>>;

/// Whether an attribute is a primary input or derived from others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// Set directly, or via a scenario override. Carries no `calculate`.
    Input,
    /// Derived from `dependencies` via `calculate`. Starts `value = None`.
    Calculated,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Input => write!(f, "input"),
            AttributeKind::Calculated => write!(f, "calculated"),
        }
    }
}

/// A named value in the model: either a primary input or a value derived
/// from other attributes by a user-supplied [`Calculate`] function.
///
/// # Invariants
/// - `kind = Input` implies `calculate` is `None`.
/// - `kind = Calculated` implies `calculate` is `Some`; `value` starts `None`.
/// - `dependencies` may name ids that are never registered; such ids are
///   dropped from the dependency graph at registration time but remain here
///   for documentation (see [`crate::graph::DependencyGraph`]).
pub struct Attribute {
    pub id: String,
    pub name: String,
    pub kind: AttributeKind,
    pub value: Option<f64>,
    pub dependencies: Vec<String>,
    pub calculate: Option<Calculate>,
    pub metadata: Metadata,
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("dependencies", &self.dependencies)
            .field("calculate", &self.calculate.as_ref().map(|_| "<fn>"))
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// `calculate` is a boxed closure and cannot be serialized; every other
/// field round-trips as-is.
impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Attribute", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("dependencies", &self.dependencies)?;
        state.serialize_field("metadata", &self.metadata)?;
        state.end()
    }
}

impl Attribute {
    /// Construct an input attribute with an initial (possibly absent) value.
    pub fn input(id: impl Into<String>, name: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: AttributeKind::Input,
            value,
            dependencies: Vec::new(),
            calculate: None,
            metadata: Metadata::new(),
        }
    }

    /// Construct a calculated attribute. `value` starts `None` until a run
    /// computes it.
    pub fn calculated(
        id: impl Into<String>,
        name: impl Into<String>,
        dependencies: Vec<String>,
        calculate: Calculate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: AttributeKind::Calculated,
            value: None,
            dependencies,
            calculate: Some(calculate),
            metadata: Metadata::new(),
        }
    }

    /// Attach metadata, builder-style.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, AttributeKind::Input)
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.kind, AttributeKind::Calculated)
    }
}
