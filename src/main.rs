use std::f64::consts::PI;
use std::{env, fs};

use anyhow::Context;
use chrono::Datelike;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pricing_engine::competitor::predict_competitor_response;
use pricing_engine::demand::segment_demand;
use pricing_engine::forecast::forecast_optimal_prices;
use pricing_engine::inventory::calculate_optimal_order_quantity;
use pricing_engine::monte_carlo::calculate_risk_adjusted_price;
use pricing_engine::optimizer::calculate_optimal_price;
use pricing_engine::reporting::{
    display_forecast, display_inventory_plan, display_market_view, display_optimization_result,
    display_risk_analysis, display_sensitivity,
};
use pricing_engine::sensitivity::{sensitivity_analysis, sweep_values, TunableField};
use pricing_engine::{EngineConfig, Month, ScenarioParameters};

/// Built-in scenario: three years of seasonal demand with mild growth
fn demo_scenario() -> Value {
    let history: Vec<f64> = (0..36)
        .map(|t| 1000.0 + 5.0 * t as f64 + 150.0 * (2.0 * PI * t as f64 / 12.0).sin())
        .collect();

    json!({
        "initial_price": 50.0,
        "initial_quantity": 1000.0,
        "price_elasticity": -1.5,
        "fixed_costs": 10000.0,
        "variable_costs": 20.0,
        "competitor_price": 55.0,
        "seasonality_factor": 0.3,
        "market_players": ["Northwind", "Contoso"],
        "competitor_prices_history": [52.0, 54.5, 55.0, 56.0, 53.5],
        "historical_demands": history,
    })
}

/// Month from the scenario file, else the current calendar month
fn scenario_month(bundle: &Value) -> anyhow::Result<Month> {
    match bundle.get("month") {
        None | Some(Value::Null) => Ok(Month::new(chrono::Local::now().month())?),
        Some(value) => {
            let m = value.as_u64().context("month must be a non-negative integer")?;
            let m = u32::try_from(m).with_context(|| format!("month {} out of range", m))?;
            Ok(Month::new(m)?)
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        EngineConfig::default()
    });

    // Optional scenario file as the first argument
    let bundle = match env::args().nth(1) {
        Some(path) => {
            let raw = fs::read_to_string(&path).with_context(|| format!("reading scenario {}", path))?;
            serde_json::from_str::<Value>(&raw).with_context(|| format!("parsing scenario {}", path))?
        }
        None => demo_scenario(),
    };
    let params = ScenarioParameters::from_json(&bundle, config.demand_composition)?;
    let month = scenario_month(&bundle)?;
    info!(month = month.number(), composition = ?params.demand_composition, "pricing scenario loaded");

    // Step 1: Optimal price
    let result = calculate_optimal_price(&params, month, &config.solver)?;
    display_optimization_result(&result);

    // Step 2: Market view at the optimum
    let mut rng = match config.risk.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let segments = segment_demand(&params, result.optimal_price)?;
    let competitors = predict_competitor_response(&params, result.optimal_price, &mut rng)?;
    display_market_view(result.optimal_price, &segments, &competitors);

    // Step 3: Sensitivity of the optimum to the competitor's price
    let field = TunableField::CompetitorPrice;
    let range = config.sensitivity.default_range_percent;
    let sweep = sensitivity_analysis(&params, field.name(), range, month, &config.solver)?;
    display_sensitivity(field.name(), &sweep_values(field.get(&params), range), &sweep);

    // Step 4: Inventory sizing for a year of demand at the optimum
    let annual_demand = result.optimal_quantity * 12.0;
    let plan = calculate_optimal_order_quantity(&params, annual_demand)?;
    display_inventory_plan(annual_demand, &plan);

    // Step 5: Forecast (only when enough history was supplied)
    match forecast_optimal_prices(&params, config.forecast.default_periods, month, &config.solver) {
        Ok(points) => display_forecast(&points),
        Err(e) => warn!("Skipping forecast: {}", e),
    }

    // Step 6: Risk-adjusted price
    let analysis = calculate_risk_adjusted_price(&params, month, &config.solver, &config.risk, &mut rng)?;
    display_risk_analysis(&analysis);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_month() {
        assert_eq!(scenario_month(&json!({ "month": 7 })).unwrap().number(), 7);
        assert!(scenario_month(&json!({})).is_ok());
        assert!(scenario_month(&json!({ "month": 4_294_967_299u64 })).is_err());
        assert!(scenario_month(&json!({ "month": "7" })).is_err());
        assert!(scenario_month(&json!({ "month": 13 })).is_err());
    }
}
