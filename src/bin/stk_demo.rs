// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};

#[path = "stk_demo/scenario_config.rs"]
mod scenario_config;

/// Scenario shipped alongside the crate, loaded when no path is given on
/// the command line.
const DEFAULT_SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/production_cost_chain.yaml");

/// One named override to apply on top of a scenario's base model, entered
/// on the command line as `attribute_id=value`.
struct Override {
    attribute_id: String,
    value: f64,
}

fn parse_override(arg: &str) -> anyhow::Result<Override> {
    let Some((id, value)) = arg.split_once('=') else {
        bail!("'{arg}' is not of the form id=value");
    };
    let value: f64 = value.parse().with_context(|| format!("'{value}' is not a number"))?;
    Ok(Override { attribute_id: id.to_string(), value })
}

fn print_usage(program: &str) {
    println!("Usage: {program} [scenario.yaml] [attribute_id=value ...]");
    println!();
    println!("Loads a YAML scenario file (model topology plus overrides; defaults to");
    println!("the bundled production cost chain scenario), runs it, and prints the");
    println!("resulting ResultRecord as JSON. Any number of additional scenario");
    println!("overrides may be supplied on the command line and are applied on top of");
    println!("the file's own `overrides` map, e.g.:");
    println!();
    println!("  {program} scenarios/production_cost_chain.yaml base_energy_price=0.375");
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return Ok(());
    }

    let mut rest = &args[1..];
    let scenario_path = match rest.first() {
        Some(first) if !first.contains('=') => {
            let path = PathBuf::from(first);
            rest = &rest[1..];
            path
        }
        _ => PathBuf::from(DEFAULT_SCENARIO),
    };

    println!("🏭 STK Production Cost Chain Demo");
    println!("══════════════════════════════════");
    println!("📄 Scenario: {}", scenario_path.display());

    let config = scenario_config::load_config(&scenario_path).map_err(|e| {
        print_usage(&args[0]);
        e
    })?;
    let mut sim = scenario_config::build_simulation(config)?;

    for arg in rest {
        let over = parse_override(arg).map_err(|e| {
            print_usage(&args[0]);
            e
        })?;
        println!("⚙️  Overriding {} = {}", over.attribute_id, over.value);
        sim.set_scenario_override(over.attribute_id, over.value);
    }

    println!("\n▶️  Running simulation '{}'...", sim.id);
    let record = sim.run();

    println!("\n📊 Result: {}", record.status);
    println!("⏱️  Execution time: {:?}", record.execution_time);
    println!("🔁 Cycles resolved: {}", record.cycles_resolved);
    println!();

    let mut ids: Vec<&String> = record.calculated_values.keys().collect();
    ids.sort();
    for id in ids {
        println!("  {:<22} {:>14.4}", id, record.calculated_values[id]);
    }

    if let Some(reason) = &record.error_message {
        println!("\n❌ {reason}");
    }

    let json = serde_json::to_string_pretty(&record).context("serializing the result record")?;
    println!("\n{json}");

    Ok(())
}
