//! Walks through the `market_demand` / `selling_price` cycle in isolation,
//! printing how many iterations the solver needed and whether it converged
//! or was stabilized after detecting oscillation.

use stk_simulate::{Attribute, Block, Simulation};

fn main() {
    println!("💲 Selling Price / Market Demand Cycle");
    println!("════════════════════════════════════════\n");

    let mut block = Block::new("pricing", "Pricing");
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
            vec!["market_demand".into()],
            Box::new(|deps, _meta| {
                let demand = deps.get("market_demand").copied().unwrap_or(1.0);
                Ok(40.0 + 5_000_000.0 / demand.max(1.0))
            }),
        ))
        .unwrap();

    let mut sim = Simulation::new("pricing-cycle");
    sim.add_block(block).unwrap();
    let record = sim.run();

    println!("status:          {}", record.status);
    println!("cycles_resolved: {}", record.cycles_resolved);
    println!("market_demand:   {:.2}", record.calculated_values["market_demand"]);
    println!("selling_price:   {:.2}", record.calculated_values["selling_price"]);
}
