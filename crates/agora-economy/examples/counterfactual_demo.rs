//! Demonstration of economy construction and counterfactual recomputation
//!
//! Builds a two-market economy with product fixed effects absorbed from the
//! linear characteristics, then:
//! - inspects dimensions and market partitions
//! - recomputes X1 without absorbed fixed effects
//! - recomputes X1 under a 10% price increase
//! - applies the bound absorption operator to the recomputed matrix
//!
//! Run with `RUST_LOG=debug` to see construction logs.

use std::sync::Arc;

use agora_data::frame::label_columns;
use agora_data::{
    AgentTable, DataOverride, MatrixField, MatrixFormula, ProductTable, VariableSource,
};
use agora_economy::{Economy, EconomyError, ProductFormulations};
use agora_formulation::{Expr, Formulation};
use ndarray::Array2;
use polars::df;
use polars::prelude::DataFrame;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("==========================================================");
    println!("          Agora Economy - Counterfactual Demo");
    println!("==========================================================\n");

    let data = product_data()?;
    let economy = build_economy(&data)?;

    // Demo 1: Dimensions and partitions
    demo_dimensions(&economy);

    // Demo 2: X1 without absorbed fixed effects
    demo_true_x1(&economy)?;

    // Demo 3: Price counterfactual
    demo_price_counterfactual(&economy, &data)?;

    println!("==========================================================");
    println!("                    Demo Complete!");
    println!("==========================================================");
    Ok(())
}

fn product_data() -> polars::prelude::PolarsResult<DataFrame> {
    df!(
        "market_ids" => &["2020", "2020", "2020", "2021", "2021"],
        "firm_ids" => &[1i64, 1, 2, 1, 2],
        "product_ids" => &[10i64, 20, 30, 10, 20],
        "prices" => &[1.00, 1.40, 2.10, 1.10, 1.55],
        "sugar" => &[2.0, 5.0, 9.0, 2.0, 5.0]
    )
}

/// Store X1 demeaned by product identifiers, the way an estimation problem would.
fn build_economy(data: &DataFrame) -> Result<Economy, Box<dyn std::error::Error>> {
    let x1 =
        Formulation::new([Expr::var("prices"), Expr::var("sugar")]).with_absorb(&["product_ids"]);
    let raw = x1.build_field(data)?;
    let ids = label_columns(data, x1.absorb_columns())?;
    let absorbed = x1.build_absorb(ids.view())?.absorb(raw.values())?;

    let products = ProductTable::builder(data.clone())
        .firm_ids(&["firm_ids"])
        .demand_ids(x1.absorb_columns())
        .x1(MatrixField::new(absorbed, raw.formulations().to_vec()))
        .build()?;

    let agent_data = df!(
        "market_ids" => &["2020", "2020", "2021", "2021"],
        "income" => &[1.2, 0.8, 1.5, 0.9]
    )?;
    let demographics = Formulation::new([Expr::var("income").ln()]);
    let agents = AgentTable::builder(agent_data.clone())
        .demographics(demographics.build_field(&agent_data)?)
        .build()?;

    let formulations = ProductFormulations::default().with_x1(Arc::new(x1));
    Ok(Economy::new(
        formulations,
        Some(Arc::new(demographics)),
        products,
        agents,
    )?)
}

fn demo_dimensions(economy: &Economy) {
    println!("----------------------------------------------------------");
    println!("Demo 1: Dimensions and Market Partitions");
    println!("----------------------------------------------------------");

    let dimensions = economy.dimensions();
    println!(
        "N = {}, T = {}, K1 = {}, D = {}, ED = {}",
        dimensions.n, dimensions.t, dimensions.k1, dimensions.d, dimensions.ed
    );
    for market in economy.markets() {
        println!(
            "  market {}: {} products, {} agents",
            market.id(),
            market.product_count(),
            market.agent_count()
        );
    }
    println!("max_J = {}, max_I = {}\n", economy.max_j(), economy.max_i());
}

fn demo_true_x1(economy: &Economy) -> Result<(), EconomyError> {
    println!("----------------------------------------------------------");
    println!("Demo 2: X1 Without Absorbed Fixed Effects");
    println!("----------------------------------------------------------");

    let columns: Vec<String> = economy
        .x1_formulations()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("Columns: {columns:?}");
    println!("Stored (absorbed) X1:");
    print_matrix(economy.products().x1().values());
    println!("True X1:");
    print_matrix(&economy.compute_true_x1(None, None)?);
    println!();
    Ok(())
}

fn demo_price_counterfactual(
    economy: &Economy,
    data: &DataFrame,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("----------------------------------------------------------");
    println!("Demo 3: Price Counterfactual (+10%)");
    println!("----------------------------------------------------------");

    economy.validate_name("prices")?;
    let prices = data.variable("prices")?;
    let overrides = DataOverride::new().with("prices", &prices * 1.1);

    let counterfactual = economy.compute_true_x1(Some(&overrides), Some(&[true, false]))?;
    println!("Counterfactual price column:");
    print_matrix(&counterfactual);

    if let Some(absorb) = economy.absorb_demand_ids() {
        let full = economy.compute_true_x1(Some(&overrides), None)?;
        println!("Counterfactual X1 after absorbing product fixed effects:");
        print_matrix(&absorb.absorb(&full)?);
    }
    println!();
    Ok(())
}

fn print_matrix(matrix: &Array2<f64>) {
    for row in matrix.rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>8.4}")).collect();
        println!("  [{}]", cells.join(", "));
    }
}
