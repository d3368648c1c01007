//! Walks through the energy-shock scenario: a baseline production cost
//! chain, then the same chain with `base_energy_price` tripled, printed
//! side by side so the propagation through `energy_cost` and
//! `production_cost` is visible.

use stk_simulate::{Attribute, Block, Simulation};

fn production_cost_block() -> Block {
    let mut block = Block::new("production", "Production");
    block.add_attribute(Attribute::input("base_energy_price", "Base Energy Price", Some(0.15))).unwrap();
    block.add_attribute(Attribute::input("production_volume", "Production Volume", Some(1000.0))).unwrap();
    block.add_attribute(Attribute::input("material_cost", "Material Cost", Some(25000.0))).unwrap();
    block.add_attribute(Attribute::input("labor_cost", "Labor Cost", Some(15000.0))).unwrap();
    block
        .add_attribute(Attribute::calculated(
            "energy_cost",
            "Energy Cost",
            vec!["base_energy_price".into(), "production_volume".into()],
            Box::new(|deps, _meta| {
                let price = deps.get("base_energy_price").copied().unwrap_or(0.0);
                let volume = deps.get("production_volume").copied().unwrap_or(0.0);
                Ok(price * volume * 2.5)
            }),
        ))
        .unwrap();
    block
        .add_attribute(Attribute::calculated(
            "production_cost",
            "Production Cost",
            vec!["material_cost".into(), "energy_cost".into(), "labor_cost".into()],
            Box::new(|deps, _meta| {
                let material = deps.get("material_cost").copied().unwrap_or(0.0);
                let energy = deps.get("energy_cost").copied().unwrap_or(0.0);
                let labor = deps.get("labor_cost").copied().unwrap_or(0.0);
                Ok((material + energy + labor) * 1.15)
            }),
        ))
        .unwrap();
    block
}

fn main() {
    println!("⚡ Energy Shock Scenario");
    println!("═════════════════════════\n");

    let mut baseline = Simulation::new("baseline");
    baseline.add_block(production_cost_block()).unwrap();
    let baseline_result = baseline.run();

    let mut shocked = Simulation::new("energy-shock");
    shocked.add_block(production_cost_block()).unwrap();
    shocked.set_scenario_override("base_energy_price", 0.375);
    let shocked_result = shocked.run();

    println!("{:<20} {:>14} {:>14} {:>10}", "attribute", "baseline", "shocked", "delta %");
    for id in ["base_energy_price", "energy_cost", "production_cost"] {
        let before = baseline_result.calculated_values.get(id).copied().unwrap_or(0.0);
        let after = shocked_result.calculated_values.get(id).copied().unwrap_or(0.0);
        let delta_pct = if before.abs() > 1e-9 { (after - before) / before * 100.0 } else { 0.0 };
        println!("{id:<20} {before:>14.4} {after:>14.4} {delta_pct:>9.1}%");
    }

    println!("\n📈 A 150% jump in base_energy_price propagated to a {:.1}% increase in production_cost.",
        (shocked_result.calculated_values["production_cost"] - baseline_result.calculated_values["production_cost"])
            / baseline_result.calculated_values["production_cost"] * 100.0);
}
