/// Engine boundary
/// Decoded request bodies in, `{success, data | error}` envelopes with a status code out

use chrono::Datelike;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::config::EngineConfig;
use crate::error::{PricingError, Result};
use crate::forecast::forecast_optimal_prices;
use crate::models::{ForecastPoint, Month, OptimizationResult, RiskAnalysis, ScenarioParameters};
use crate::monte_carlo::calculate_risk_adjusted_price;
use crate::optimizer::calculate_optimal_price;
use crate::sensitivity::sensitivity_analysis;

const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// Status code plus JSON body, ready for whatever transport sits in front
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => ApiResponse {
                status: 200,
                body: json!({ "success": true, "data": data }),
            },
            Err(e) => Self::from_error(PricingError::Internal(format!("failed to encode result: {}", e))),
        }
    }

    fn from_error(err: PricingError) -> Self {
        if err.is_client_error() {
            ApiResponse {
                status: 400,
                body: json!({ "success": false, "error": err.to_string() }),
            }
        } else {
            error!("Internal Server Error: {}", err);
            ApiResponse {
                status: 500,
                body: json!({ "success": false, "error": GENERIC_FAILURE }),
            }
        }
    }

    fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(&data),
            Err(err) => Self::from_error(err),
        }
    }
}

/// Non-negative integer field; absent or null means not supplied
fn optional_u64(body: &Value, key: &str) -> Result<Option<u64>> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(Some)
            .ok_or_else(|| PricingError::Validation(format!("Invalid value for {}", key))),
    }
}

/// Month named in the request, else the current calendar month
fn request_month(body: &Value) -> Result<Month> {
    match optional_u64(body, "month")? {
        None => Month::new(chrono::Local::now().month()),
        Some(month) => Month::new(u32::try_from(month).unwrap_or(0)),
    }
}

fn scenario(body: &Value, config: &EngineConfig) -> Result<ScenarioParameters> {
    ScenarioParameters::from_json(body, config.demand_composition)
}

fn run_simulate(body: &Value, config: &EngineConfig) -> Result<OptimizationResult> {
    let params = scenario(body, config)?;
    calculate_optimal_price(&params, request_month(body)?, &config.solver)
}

fn run_sensitivity(body: &Value, config: &EngineConfig) -> Result<Vec<OptimizationResult>> {
    let inputs = body
        .get("inputs")
        .ok_or_else(|| PricingError::Validation("Missing required field: inputs".to_string()))?;
    let variable = body
        .get("variable")
        .and_then(Value::as_str)
        .ok_or_else(|| PricingError::Validation("Missing required field: variable".to_string()))?;
    let range_percent = match body.get("range_percent") {
        None | Some(Value::Null) => config.sensitivity.default_range_percent,
        Some(value) => value
            .as_f64()
            .ok_or_else(|| PricingError::Validation("Invalid numeric value for range_percent".to_string()))?,
    };
    let params = scenario(inputs, config)?;
    sensitivity_analysis(&params, variable, range_percent, request_month(inputs)?, &config.solver)
}

fn run_forecast(body: &Value, config: &EngineConfig) -> Result<Vec<ForecastPoint>> {
    let periods = match optional_u64(body, "periods")? {
        None => config.forecast.default_periods,
        Some(periods) => usize::try_from(periods)
            .map_err(|_| PricingError::InvalidParameter(format!("periods out of range: {}", periods)))?,
    };
    let params = scenario(body, config)?;
    forecast_optimal_prices(&params, periods, request_month(body)?, &config.solver)
}

fn run_risk_analysis(body: &Value, config: &EngineConfig) -> Result<RiskAnalysis> {
    let params = scenario(body, config)?;
    let seed = optional_u64(body, "seed")?.or(config.risk.seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    calculate_risk_adjusted_price(&params, request_month(body)?, &config.solver, &config.risk, &mut rng)
}

/// `simulate`: optimal price for the posted scenario
pub fn simulate(body: &Value, config: &EngineConfig) -> ApiResponse {
    ApiResponse::from_result(run_simulate(body, config))
}

/// `sensitivity`: `{inputs, variable, range_percent?}`
pub fn sensitivity(body: &Value, config: &EngineConfig) -> ApiResponse {
    ApiResponse::from_result(run_sensitivity(body, config))
}

/// `forecast`: scenario plus optional `periods`
pub fn forecast(body: &Value, config: &EngineConfig) -> ApiResponse {
    ApiResponse::from_result(run_forecast(body, config))
}

/// `risk-analysis`: baseline optimum with VaR-based adjustment. A `seed` in the body
/// overrides the configured one.
pub fn risk_analysis(body: &Value, config: &EngineConfig) -> ApiResponse {
    ApiResponse::from_result(run_risk_analysis(body, config))
}

pub fn health() -> ApiResponse {
    ApiResponse {
        status: 200,
        body: json!({ "status": "healthy" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> Value {
        json!({
            "initial_price": 50,
            "initial_quantity": 1000,
            "price_elasticity": -1.5,
            "fixed_costs": 10000,
            "variable_costs": 20,
            "competitor_price": 55,
            "month": 3
        })
    }

    #[test]
    fn test_simulate_success_envelope() {
        let response = simulate(&bundle(), &EngineConfig::default());
        assert_eq!(response.status, 200);
        assert_eq!(response.body["success"], json!(true));
        let price = response.body["data"]["optimal_price"].as_f64().unwrap();
        assert!(price > 22.0 && price <= 150.0);
    }

    #[test]
    fn test_missing_field_is_client_error() {
        let mut body = bundle();
        body.as_object_mut().unwrap().remove("initial_price");
        let response = simulate(&body, &EngineConfig::default());
        assert_eq!(response.status, 400);
        assert_eq!(response.body["success"], json!(false));
        assert_eq!(response.body["error"], json!("Missing required field: initial_price"));
    }

    #[test]
    fn test_infeasible_bounds_reported() {
        let mut body = bundle();
        body["min_margin"] = json!(0.99);
        let response = simulate(&body, &EngineConfig::default());
        assert_eq!(response.status, 400);
        assert!(response.body["error"].as_str().unwrap().contains("infeasible"));
    }

    #[test]
    fn test_invalid_month() {
        let mut body = bundle();
        body["month"] = json!(13);
        assert_eq!(simulate(&body, &EngineConfig::default()).status, 400);
    }

    #[test]
    fn test_sensitivity_returns_five_points() {
        let body = json!({ "inputs": bundle(), "variable": "competitor_price" });
        let response = sensitivity(&body, &EngineConfig::default());
        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_sensitivity_unknown_variable() {
        let body = json!({ "inputs": bundle(), "variable": "colour" });
        let response = sensitivity(&body, &EngineConfig::default());
        assert_eq!(response.status, 400);
        assert!(response.body["error"].as_str().unwrap().starts_with("Invalid parameter"));
    }

    #[test]
    fn test_forecast_requires_history() {
        let mut body = bundle();
        body["periods"] = json!(6);
        body["historical_demands"] = json!([100, 110, 120]);
        let response = forecast(&body, &EngineConfig::default());
        assert_eq!(response.status, 400);
        assert!(response.body["error"].as_str().unwrap().contains("Insufficient data"));
    }

    #[test]
    fn test_risk_analysis_seeded_and_extended() {
        let mut body = bundle();
        body["seed"] = json!(11);
        let first = risk_analysis(&body, &EngineConfig::default());
        let second = risk_analysis(&body, &EngineConfig::default());
        assert_eq!(first.status, 200);
        assert_eq!(first, second);
        let data = &first.body["data"];
        for key in ["optimal_price", "profit", "risk_adjusted_price", "value_at_risk", "price_adjustment"] {
            assert!(data.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_forecast_horizon_is_capped() {
        let mut body = bundle();
        let history: Vec<f64> = (0..36).map(|t| 1000.0 + 10.0 * (t % 12) as f64).collect();
        body["historical_demands"] = json!(history);
        body["periods"] = json!(u64::MAX);
        let response = forecast(&body, &EngineConfig::default());
        assert_eq!(response.status, 400);
        assert!(response.body["error"].as_str().unwrap().contains("at most"));

        body["periods"] = json!(3);
        let response = forecast(&body, &EngineConfig::default());
        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_unparseable_seed_rejected() {
        for seed in [json!("42"), json!(-1), json!(4.5)] {
            let mut body = bundle();
            body["seed"] = seed;
            let response = risk_analysis(&body, &EngineConfig::default());
            assert_eq!(response.status, 400);
            assert_eq!(response.body["error"], json!("Invalid value for seed"));
        }
    }

    #[test]
    fn test_out_of_range_month_rejected() {
        let mut body = bundle();
        body["month"] = json!(4_294_967_299u64);
        assert_eq!(simulate(&body, &EngineConfig::default()).status, 400);
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let response = ApiResponse::from_error(PricingError::Internal("stack trace".into()));
        assert_eq!(response.status, 500);
        assert_eq!(response.body["error"], json!(GENERIC_FAILURE));
    }

    #[test]
    fn test_health() {
        assert_eq!(health().body["status"], json!("healthy"));
    }
}
