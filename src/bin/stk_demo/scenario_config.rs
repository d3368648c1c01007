//! YAML scenario loading for the demo binary.
//!
//! A `calculate` function is a native closure and cannot be expressed in
//! YAML, so the file format covers model topology (blocks, attributes,
//! dependencies) and scenario overrides; each Calculated attribute names a
//! `calculator` which is resolved against [`calculator_by_name`], a small
//! built-in table. This mirrors how the library's own `config::processor_map`
//! resolves a `BackendType` to a concrete implementation — the config names
//! the shape, a lookup table supplies the behavior that can't be serialized.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use stk_simulate::{Attribute, Block, Calculate, Simulation};

#[derive(Debug, Deserialize)]
pub struct ScenarioConfig {
    pub simulation_id: String,
    pub blocks: Vec<BlockConfig>,
    #[serde(default)]
    pub overrides: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
pub struct BlockConfig {
    pub id: String,
    pub name: String,
    pub attributes: Vec<AttributeConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKindConfig {
    Input,
    Calculated,
}

#[derive(Debug, Deserialize)]
pub struct AttributeConfig {
    pub id: String,
    pub name: String,
    pub kind: AttributeKindConfig,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub calculator: Option<String>,
}

/// Load a scenario config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ScenarioConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("reading scenario file '{}'", path.display()))?;
    let config: ScenarioConfig =
        serde_yaml::from_str(&content).with_context(|| format!("parsing scenario file '{}'", path.display()))?;
    Ok(config)
}

/// Build a runnable [`Simulation`] from a parsed config, resolving each
/// Calculated attribute's named calculator against the built-in table and
/// applying `overrides` last.
pub fn build_simulation(config: ScenarioConfig) -> anyhow::Result<Simulation> {
    let mut sim = Simulation::new(config.simulation_id);

    for block_config in config.blocks {
        let mut block = Block::new(block_config.id, block_config.name);
        for attribute_config in block_config.attributes {
            let attribute = match attribute_config.kind {
                AttributeKindConfig::Input => {
                    Attribute::input(attribute_config.id, attribute_config.name, attribute_config.value)
                }
                AttributeKindConfig::Calculated => {
                    let calculator_name = attribute_config.calculator.ok_or_else(|| {
                        anyhow::anyhow!("attribute '{}' is calculated but names no calculator", attribute_config.id)
                    })?;
                    let calculate = calculator_by_name(&calculator_name)
                        .with_context(|| format!("attribute '{}'", attribute_config.id))?;
                    Attribute::calculated(
                        attribute_config.id,
                        attribute_config.name,
                        attribute_config.dependencies,
                        calculate,
                    )
                }
            };
            block.add_attribute(attribute).with_context(|| format!("block '{}'", block.id))?;
        }
        sim.add_block(block)?;
    }

    for (attribute_id, value) in config.overrides {
        sim.set_scenario_override(attribute_id, value);
    }

    Ok(sim)
}

/// The demo's built-in calculators, keyed by the name a scenario file names
/// in its `calculator` field. Unrecognized names fail with a message naming
/// the offender, matching `ProcessorMap::from_config`'s unimplemented-backend
/// errors.
fn calculator_by_name(name: &str) -> anyhow::Result<Calculate> {
    let calculate: Calculate = match name {
        "energy_cost" => Box::new(|deps: &HashMap<String, f64>, _meta| {
            let price = deps.get("base_energy_price").copied().unwrap_or(0.0);
            let volume = deps.get("production_volume").copied().unwrap_or(0.0);
            Ok(price * volume * 2.5)
        }),
        "production_cost" => Box::new(|deps: &HashMap<String, f64>, _meta| {
            let material = deps.get("material_cost").copied().unwrap_or(0.0);
            let energy = deps.get("energy_cost").copied().unwrap_or(0.0);
            let labor = deps.get("labor_cost").copied().unwrap_or(0.0);
            Ok((material + energy + labor) * 1.15)
        }),
        "market_demand" => Box::new(|deps: &HashMap<String, f64>, _meta| {
            let price = deps.get("selling_price").copied().unwrap_or(0.0);
            Ok((2000.0 - price * 15.0).max(100.0))
        }),
        "selling_price" => Box::new(|deps: &HashMap<String, f64>, _meta| {
            let production_cost = deps.get("production_cost").copied().unwrap_or(0.0);
            let demand = deps.get("market_demand").copied().unwrap_or(1.0);
            let unit_cost = production_cost / 1000.0;
            Ok(unit_cost * 1.2 * (1000.0 / demand.max(1.0)).sqrt())
        }),
        other => bail!("calculator '{other}' is not registered in the demo's built-in table"),
    };
    Ok(calculate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
simulation_id: test-sim
blocks:
  - id: production
    name: Production
    attributes:
      - id: base_energy_price
        name: Base Energy Price
        kind: input
        value: 0.15
      - id: production_volume
        name: Production Volume
        kind: input
        value: 1000.0
      - id: energy_cost
        name: Energy Cost
        kind: calculated
        dependencies: [base_energy_price, production_volume]
        calculator: energy_cost
overrides:
  base_energy_price: 0.3
"#;

    #[test]
    fn parses_blocks_attributes_and_overrides() {
        let config: ScenarioConfig = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.simulation_id, "test-sim");
        assert_eq!(config.blocks.len(), 1);
        assert_eq!(config.blocks[0].attributes.len(), 3);
        assert_eq!(config.overrides["base_energy_price"], 0.3);
    }

    #[test]
    fn build_simulation_runs_the_resolved_calculator() {
        let config: ScenarioConfig = serde_yaml::from_str(SAMPLE).unwrap();
        let mut sim = build_simulation(config).unwrap();
        let record = sim.run();
        // override replaces base_energy_price (0.15 -> 0.3) before the run
        assert_eq!(record.calculated_values["energy_cost"], 0.3 * 1000.0 * 2.5);
    }

    #[test]
    fn unknown_calculator_name_fails_with_a_clear_message() {
        let yaml = r#"
simulation_id: bad-sim
blocks:
  - id: b
    name: B
    attributes:
      - id: c
        name: C
        kind: calculated
        dependencies: []
        calculator: not_a_real_calculator
"#;
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        let err = build_simulation(config).unwrap_err();
        assert!(err.to_string().contains("not_a_real_calculator"));
    }

    #[test]
    fn load_config_reads_a_scenario_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.simulation_id, "test-sim");
    }

    #[test]
    fn load_config_reports_the_path_when_the_file_is_missing() {
        let err = load_config("/no/such/scenario.yaml").unwrap_err();
        assert!(err.to_string().contains("/no/such/scenario.yaml"));
    }
}
