// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The top-level programmatic surface: [`Simulation`], the owner of every
//! block, attribute, the dependency graph, and scenario overrides for a
//! single model.

use std::collections::HashMap;

use serde::Serialize;

use crate::errors::ConfigurationError;
use crate::graph::DependencyGraph;
use crate::model::{Attribute, Block};
use crate::registry::Registry;
use crate::result::ResultRecord;
use crate::scenario::ScenarioStore;

/// A snapshot of a simulation's shape, returned by [`Simulation::summary`].
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub simulation_id: String,
    pub total_blocks: usize,
    pub total_attributes: usize,
    pub scenario_overrides: usize,
    pub dependency_relationships: usize,
    pub status: String,
}

/// Owns every [`Block`] (and, transitively, every [`Attribute`]) for one
/// model, plus the [`Registry`] and [`DependencyGraph`] built from them and
/// the [`ScenarioStore`] applied on each [`Simulation::run`].
#[derive(Debug)]
pub struct Simulation {
    pub id: String,
    blocks: Vec<Block>,
    registry: Registry,
    graph: DependencyGraph,
    overrides: ScenarioStore,
    last_status: Option<String>,
}

impl Simulation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            blocks: Vec::new(),
            registry: Registry::new(),
            graph: DependencyGraph::new(),
            overrides: ScenarioStore::new(),
            last_status: None,
        }
    }

    /// Register a block's attributes into the registry and dependency
    /// graph. Attribute ids in `block` are registered before dependency
    /// edges are built, so dependencies declared between attributes in the
    /// same block resolve correctly; dependencies naming ids not yet
    /// registered in any block (this one or an earlier one) are logged and
    /// dropped from the graph, per the model's stated invariant — they
    /// remain in `attribute.dependencies` for documentation only.
    pub fn add_block(&mut self, block: Block) -> Result<(), ConfigurationError> {
        let block_index = self.blocks.len();
        for attribute in block.attributes() {
            self.registry.register(&attribute.id, block_index)?;
        }
        for attribute in block.attributes() {
            self.graph.add_node(&attribute.id);
            for dependency in &attribute.dependencies {
                if self.registry.contains(dependency) {
                    self.graph.add_edge(dependency, &attribute.id);
                } else {
                    tracing::warn!(
                        attribute_id = attribute.id.as_str(),
                        dependency = dependency.as_str(),
                        "dependency is not registered in any block; dropping the graph edge"
                    );
                }
            }
        }
        self.blocks.push(block);
        Ok(())
    }

    pub fn set_scenario_override(&mut self, attribute_id: impl Into<String>, value: f64) {
        self.overrides.set(attribute_id, value);
    }

    pub fn clear_scenario_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn run(&mut self) -> ResultRecord {
        let record = crate::orchestrator::run(self);
        self.last_status = Some(record.status.to_string());
        record
    }

    pub fn summary(&self) -> Summary {
        Summary {
            simulation_id: self.id.clone(),
            total_blocks: self.blocks.len(),
            total_attributes: self.attribute_ids().len(),
            scenario_overrides: self.overrides.len(),
            dependency_relationships: self.graph.nodes().map(|id| self.graph.dependents_of(id).len()).sum(),
            status: self.last_status.clone().unwrap_or_else(|| "not_run".to_string()),
        }
    }

    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        let index = self.registry.block_index_of(id)?;
        self.blocks.get(index)?.get_attribute(id)
    }

    pub fn attribute_mut(&mut self, id: &str) -> Option<&mut Attribute> {
        let index = self.registry.block_index_of(id)?;
        self.blocks.get_mut(index)?.get_attribute_mut(id)
    }

    pub fn set_value(&mut self, id: &str, value: f64) {
        if let Some(attribute) = self.attribute_mut(id) {
            attribute.value = Some(value);
        }
    }

    /// Call `id`'s `calculate` with `context`, without mutating its value.
    /// `None` if `id` is unknown or is an Input (no `calculate` to run).
    pub fn run_calculate(&self, id: &str, context: &HashMap<String, f64>) -> Option<Result<f64, String>> {
        let attribute = self.attribute(id)?;
        let calculate = attribute.calculate.as_ref()?;
        Some(calculate(context, &attribute.metadata))
    }

    /// Every attribute id across every block, in block-then-insertion
    /// order (not necessarily a dependency order).
    pub fn attribute_ids(&self) -> Vec<String> {
        self.blocks.iter().flat_map(|b| b.attributes().map(|a| a.id.clone())).collect()
    }

    /// Current non-null value of every attribute across the whole model.
    pub fn snapshot(&self) -> HashMap<String, f64> {
        let mut values = HashMap::new();
        for block in &self.blocks {
            for attribute in block.attributes() {
                if let Some(value) = attribute.value {
                    values.insert(attribute.id.clone(), value);
                }
            }
        }
        values
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn overrides(&self) -> &ScenarioStore {
        &self.overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attribute;

    fn sum_block() -> Block {
        let mut block = Block::new("totals", "Totals");
        block.add_attribute(Attribute::input("a", "A", Some(10.0))).unwrap();
        block.add_attribute(Attribute::input("b", "B", Some(20.0))).unwrap();
        block
            .add_attribute(Attribute::calculated("c", "C", vec!["a".into(), "b".into()], Box::new(|deps, _| {
                Ok(deps.get("a").copied().unwrap_or(0.0) + deps.get("b").copied().unwrap_or(0.0))
            })))
            .unwrap();
        block
    }

    #[test]
    fn acyclic_sum_computes_expected_values() {
        let mut sim = Simulation::new("sum-test");
        sim.add_block(sum_block()).unwrap();
        let record = sim.run();
        assert_eq!(record.calculated_values.get("a"), Some(&10.0));
        assert_eq!(record.calculated_values.get("b"), Some(&20.0));
        assert_eq!(record.calculated_values.get("c"), Some(&30.0));
    }

    #[test]
    fn override_on_input_flows_through_to_calculated_attribute() {
        let mut sim = Simulation::new("override-test");
        sim.add_block(sum_block()).unwrap();
        sim.set_scenario_override("a", 7.0);
        let record = sim.run();
        assert_eq!(record.calculated_values.get("a"), Some(&7.0));
        assert_eq!(record.calculated_values.get("c"), Some(&27.0));
    }

    #[test]
    fn override_on_calculated_attribute_is_ignored() {
        let mut sim = Simulation::new("override-ignored");
        sim.add_block(sum_block()).unwrap();
        sim.set_scenario_override("c", 999.0);
        let record = sim.run();
        assert_eq!(record.calculated_values.get("c"), Some(&30.0));
    }

    #[test]
    fn override_on_unknown_id_is_ignored() {
        let mut sim = Simulation::new("override-unknown");
        sim.add_block(sum_block()).unwrap();
        sim.set_scenario_override("nonexistent", 1.0);
        let record = sim.run();
        assert!(record.is_success());
    }

    #[test]
    fn duplicate_id_across_blocks_fails_add_block() {
        let mut sim = Simulation::new("dup-test");
        sim.add_block(sum_block()).unwrap();
        let mut dup_block = Block::new("dup", "Dup");
        dup_block.add_attribute(Attribute::input("a", "A again", Some(1.0))).unwrap();
        let err = sim.add_block(dup_block).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateId { id } if id == "a"));
    }

    #[test]
    fn summary_reports_shape_and_last_status() {
        let mut sim = Simulation::new("summary-test");
        sim.add_block(sum_block()).unwrap();
        let summary_before = sim.summary();
        assert_eq!(summary_before.status, "not_run");
        assert_eq!(summary_before.total_attributes, 3);

        sim.run();
        let summary_after = sim.summary();
        assert_eq!(summary_after.status, "completed");
    }
}
