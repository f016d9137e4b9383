/// Reporting and output formatting module
/// Handles all console output and result presentation

use std::collections::BTreeMap;

use crate::models::{ForecastPoint, InventoryPlan, OptimizationResult, RiskAnalysis};

fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║ {:^76} ║", title);
    println!("╚══════════════════════════════════════════════════════════════════════════════╝\n");
}

/// Display the profit-maximizing price and its derived metrics
pub fn display_optimization_result(result: &OptimizationResult) {
    banner("OPTIMAL PRICE");
    println!("  Optimal Price:           ${:.2}", result.optimal_price);
    println!("  Quality-Adjusted Price:  ${:.2}", result.quality_adjusted_price);
    println!("  Optimal Quantity:        {:.2} units", result.optimal_quantity);
    println!("  Revenue:                 ${:.2}", result.revenue);
    println!("  Profit:                  ${:.2}", result.profit);
    println!("  Profit Margin:           {:.1}%", result.profit_margin * 100.0);
    println!("  Market Share:            {:.1}%", result.market_share * 100.0);
    println!("  Break-Even Point:        {:.2} units", result.break_even_point);
    println!("  Seasonality Impact:      x{:.3}", result.seasonality_impact);
}

/// Display the sensitivity sweep for one parameter
pub fn display_sensitivity(field: &str, values: &[f64], results: &[OptimizationResult]) {
    banner(&format!("SENSITIVITY: {}", field.to_uppercase()));
    println!("  {:>12} | {:>10} | {:>12} | {:>8}", field, "Price", "Profit", "Share");
    for (value, result) in values.iter().zip(results) {
        println!(
            "  {:>12.3} | ${:>9.2} | ${:>11.2} | {:>7.1}%",
            value,
            result.optimal_price,
            result.profit,
            result.market_share * 100.0
        );
    }
}

/// Display EOQ inventory sizing
pub fn display_inventory_plan(annual_demand: f64, plan: &InventoryPlan) {
    banner("INVENTORY PLAN");
    println!("  Annual Demand:           {:.0} units", annual_demand);
    println!("  Economic Order Qty:      {:.2} units", plan.economic_order_quantity);
    println!("  Reorder Point:           {:.2} units", plan.reorder_point);
    println!("  Orders per Year:         {:.2}", plan.orders_per_year);
    println!(
        "  Annual Cost:             ${:.2} (ordering ${:.2} + holding ${:.2})",
        plan.total_inventory_cost, plan.annual_order_cost, plan.annual_holding_cost
    );
}

/// Display the re-priced demand forecast
pub fn display_forecast(points: &[ForecastPoint]) {
    banner("DEMAND FORECAST");
    println!("  {:>6} | {:>12} | {:>10} | {:>14}", "Period", "Demand", "Price", "Profit");
    for point in points {
        println!(
            "  {:>6} | {:>12.2} | ${:>9.2} | ${:>13.2}",
            point.period, point.forecasted_demand, point.optimal_price, point.expected_profit
        );
    }
}

/// Display the risk-adjusted price with the simulated profit distribution
pub fn display_risk_analysis(analysis: &RiskAnalysis) {
    banner("RISK-ADJUSTED PRICE");
    let stats = &analysis.distribution;
    println!("  Baseline Price:          ${:.2}", analysis.result.optimal_price);
    println!("  Risk-Adjusted Price:     ${:.2}", analysis.risk_adjusted_price);
    println!("  Price Adjustment:        ${:+.2}", analysis.price_adjustment);
    println!("  Value at Risk:           ${:.2}", analysis.value_at_risk);
    println!(
        "\n  Profit Distribution ({} trials): ${:.2} ± ${:.2}",
        stats.num_trials, stats.mean_profit, stats.std_dev_profit
    );
    println!("    Minimum:          ${:.2}", stats.min_profit);
    println!("    10th Percentile:  ${:.2}", stats.percentile_10);
    println!("    25th Percentile:  ${:.2}", stats.percentile_25);
    println!("    Median (50th):    ${:.2}", stats.percentile_50);
    println!("    75th Percentile:  ${:.2}", stats.percentile_75);
    println!("    90th Percentile:  ${:.2}", stats.percentile_90);
    println!("    Maximum:          ${:.2}", stats.max_profit);
}

/// Display per-segment demand and predicted competitor prices at the chosen price
pub fn display_market_view(price: f64, segments: &BTreeMap<String, f64>, competitors: &BTreeMap<String, f64>) {
    banner(&format!("MARKET VIEW AT ${:.2}", price));
    println!("  Segment demand:");
    for (name, demand) in segments {
        println!("    {:<12} {:>10.2} units", name, demand);
    }
    if !competitors.is_empty() {
        println!("  Predicted competitor prices:");
        for (player, predicted) in competitors {
            println!("    {:<12} ${:>9.2}", player, predicted);
        }
    }
}
