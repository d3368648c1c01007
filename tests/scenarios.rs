//! End-to-end scenarios, each checking the engine's final `ResultRecord`
//! against the literal outcomes documented for this engine's six worked
//! examples plus two supplemental cyclic models.

use stk_simulate::{Attribute, Block, Simulation, SimulationStatus};

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

#[test]
fn acyclic_sum() {
    let mut block = Block::new("totals", "Totals");
    block.add_attribute(Attribute::input("a", "A", Some(10.0))).unwrap();
    block.add_attribute(Attribute::input("b", "B", Some(20.0))).unwrap();
    block
        .add_attribute(Attribute::calculated("c", "C", vec!["a".into(), "b".into()], Box::new(|deps, _| {
            Ok(deps.get("a").copied().unwrap_or(0.0) + deps.get("b").copied().unwrap_or(0.0))
        })))
        .unwrap();

    let mut sim = Simulation::new("acyclic-sum");
    sim.add_block(block).unwrap();
    let record = sim.run();

    assert_eq!(record.status, SimulationStatus::Completed);
    assert_eq!(record.calculated_values.get("a"), Some(&10.0));
    assert_eq!(record.calculated_values.get("b"), Some(&20.0));
    assert_eq!(record.calculated_values.get("c"), Some(&30.0));
}

#[test]
fn override_on_input() {
    let mut block = Block::new("totals", "Totals");
    block.add_attribute(Attribute::input("a", "A", Some(10.0))).unwrap();
    block.add_attribute(Attribute::input("b", "B", Some(20.0))).unwrap();
    block
        .add_attribute(Attribute::calculated("c", "C", vec!["a".into(), "b".into()], Box::new(|deps, _| {
            Ok(deps.get("a").copied().unwrap_or(0.0) + deps.get("b").copied().unwrap_or(0.0))
        })))
        .unwrap();

    let mut sim = Simulation::new("override-on-input");
    sim.add_block(block).unwrap();
    sim.set_scenario_override("a", 7.0);
    let record = sim.run();

    assert_eq!(record.calculated_values.get("c"), Some(&27.0));
}

#[test]
fn production_cost_chain() {
    let mut sim = Simulation::new("production-cost-chain");
    sim.add_block(production_cost_block()).unwrap();
    let record = sim.run();

    assert_eq!(record.status, SimulationStatus::Completed);
    assert!((record.calculated_values["energy_cost"] - 375.0).abs() < 1e-9);
    assert!((record.calculated_values["production_cost"] - 46431.25).abs() < 1e-9);
}

#[test]
fn energy_shock() {
    let mut sim = Simulation::new("energy-shock");
    sim.add_block(production_cost_block()).unwrap();
    sim.set_scenario_override("base_energy_price", 0.375);
    let record = sim.run();

    assert!((record.calculated_values["energy_cost"] - 937.5).abs() < 1e-9);
    assert!((record.calculated_values["production_cost"] - 47077.8125).abs() < 1e-9);
}

#[test]
fn simple_two_cycle_converges_near_the_documented_fixed_point() {
    let mut block = Block::new("pricing", "Pricing");
    block
        .add_attribute(Attribute::calculated(
            "price",
            "Price",
            vec!["demand".into()],
            Box::new(|deps, _meta| {
                let demand = deps.get("demand").copied().unwrap_or(0.0);
                Ok(demand * 0.05 + 40.0)
            }),
        ))
        .unwrap();
    block
        .add_attribute(Attribute::calculated(
            "demand",
            "Demand",
            vec!["price".into()],
            Box::new(|deps, _meta| {
                let price = deps.get("price").copied().unwrap_or(0.0);
                Ok((1500.0 - price * 20.0).max(50.0))
            }),
        ))
        .unwrap();

    let mut sim = Simulation::new("price-demand-cycle");
    sim.add_block(block).unwrap();
    let record = sim.run();

    assert_eq!(record.status, SimulationStatus::Completed);
    assert_eq!(record.cycles_resolved, 1);
    let price = record.calculated_values["price"];
    let demand = record.calculated_values["demand"];
    // Algebraic fixed point of price = 0.05*demand + 40 and
    // demand = max(50, 1500 - 20*price) is price=57.5, demand=350; from the
    // generic (non-substring-matched) seed of 100/100 the pair oscillates
    // with period 2 and is caught by the oscillation stabilizer rather than
    // the plain convergence check.
    assert!((price - 57.5).abs() < 1.0, "price {price} should be near 57.5");
    assert!((demand - 350.0).abs() < 5.0, "demand {demand} should be near 350");
}

#[test]
fn complementary_cycle_converges_to_an_asymmetric_fixed_point() {
    // Gauss-Seidel's within-iteration "most recent wins" update means a
    // complementary pair like this reaches a fixed point in two iterations
    // rather than oscillating forever, even though a naive Jacobi-style
    // (snapshot-everything-then-write) update on the same equations would
    // ping-pong indefinitely.
    let mut block = Block::new("degenerate", "Degenerate");
    block
        .add_attribute(Attribute::calculated(
            "a",
            "A",
            vec!["b".into()],
            Box::new(|deps, _meta| Ok(100.0 - deps.get("b").copied().unwrap_or(0.0))),
        ))
        .unwrap();
    block
        .add_attribute(Attribute::calculated(
            "b",
            "B",
            vec!["a".into()],
            Box::new(|deps, _meta| Ok(100.0 - deps.get("a").copied().unwrap_or(0.0))),
        ))
        .unwrap();

    let mut sim = Simulation::new("complementary-cycle");
    sim.add_block(block).unwrap();
    let record = sim.run();

    assert_eq!(record.status, SimulationStatus::Completed);
    let a = record.calculated_values["a"];
    let b = record.calculated_values["b"];
    assert!((a + b - 100.0).abs() < 1e-9, "a ({a}) + b ({b}) should sum to 100");
}

/// A second, independently-grounded cyclic model: adaptive pricing against
/// price-elastic market demand, shaped like the production system's own
/// `market_demand` / `selling_price` pair rather than the toy cycle above.
#[test]
fn market_demand_and_selling_price_cycle_converges() {
    let mut block = production_cost_block();
    block
        .add_attribute(Attribute::calculated(
            "market_demand",
            "Market Demand",
            vec!["selling_price".into()],
            Box::new(|deps, _meta| {
                let price = deps.get("selling_price").copied().unwrap_or(0.0);
                Ok((2000.0 - price * 15.0).max(100.0))
            }),
        ))
        .unwrap();
    block
        .add_attribute(Attribute::calculated(
            "selling_price",
            "Selling Price",
            vec!["production_cost".into(), "market_demand".into()],
            Box::new(|deps, _meta| {
                let production_cost = deps.get("production_cost").copied().unwrap_or(0.0);
                let demand = deps.get("market_demand").copied().unwrap_or(1.0);
                let unit_cost = production_cost / 1000.0;
                Ok(unit_cost * (1.0 + 20.0 / 100.0) * (1000.0 / demand.max(1.0)).sqrt())
            }),
        ))
        .unwrap();

    let mut sim = Simulation::new("demand-price-cycle");
    sim.add_block(block).unwrap();
    let record = sim.run();

    assert_eq!(record.cycles_resolved, 1);
    assert!(record.calculated_values.contains_key("market_demand"));
    assert!(record.calculated_values.contains_key("selling_price"));
    // The chain feeding into the cycle (production_cost) must still have
    // resolved correctly: the cycle must not corrupt the acyclic portion.
    assert!((record.calculated_values["production_cost"] - 46431.25).abs() < 1e-9);
}

#[test]
fn unknown_dependency_is_dropped_and_substituted_at_calculation_time() {
    let mut block = Block::new("b", "B");
    block
        .add_attribute(Attribute::calculated(
            "only",
            "Only",
            vec!["never_registered".into()],
            Box::new(|deps, _meta| Ok(deps.get("never_registered").copied().unwrap_or(-1.0) + 1.0)),
        ))
        .unwrap();

    let mut sim = Simulation::new("unknown-dependency");
    sim.add_block(block).unwrap();
    let record = sim.run();

    assert_eq!(record.status, SimulationStatus::Completed);
    // never_registered is absent everywhere, so the substituted 0 flows
    // through: 0 + 1 == 1.
    assert_eq!(record.calculated_values.get("only"), Some(&1.0));
}

#[test]
fn calculation_failure_substitutes_a_kind_based_default() {
    let mut block = Block::new("b", "B");
    block
        .add_attribute(Attribute::calculated(
            "selling_price_forecast",
            "Selling Price Forecast",
            vec![],
            Box::new(|_deps, _meta| Err("forecast model unavailable".to_string())),
        ))
        .unwrap();

    let mut sim = Simulation::new("calculation-failure");
    sim.add_block(block).unwrap();
    let record = sim.run();

    assert_eq!(record.calculated_values.get("selling_price_forecast"), Some(&50.0));
}
