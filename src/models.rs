use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DemandComposition;
use crate::error::{PricingError, Result};

/// Required numeric fields of an inbound scenario bundle, in wire names
pub const REQUIRED_FIELDS: [&str; 6] = [
    "initial_price",
    "initial_quantity",
    "price_elasticity",
    "fixed_costs",
    "variable_costs",
    "competitor_price",
];

/// A customer segment with its own price sensitivity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub price_sensitivity: f64,
    /// Share of the base quantity; segment sizes are not required to sum to 1
    pub size: f64,
}

/// Calendar month, 1 = January
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(u32);

impl Month {
    pub fn new(month: u32) -> Result<Self> {
        if (1..=12).contains(&month) {
            Ok(Month(month))
        } else {
            Err(PricingError::Validation(format!(
                "Invalid month {}: expected 1-12",
                month
            )))
        }
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// The month `periods` months later, wrapping into following years
    pub fn offset(self, periods: usize) -> Month {
        let zero_based = (self.0 as usize - 1 + periods) % 12;
        Month(zero_based as u32 + 1)
    }
}

impl TryFrom<u32> for Month {
    type Error = PricingError;

    fn try_from(value: u32) -> Result<Self> {
        Month::new(value)
    }
}

impl From<Month> for u32 {
    fn from(month: Month) -> u32 {
        month.0
    }
}

/// Market snapshot for one pricing run. Analyses read it and clone it, never mutate it.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioParameters {
    pub initial_price: f64,
    pub initial_quantity: f64,
    /// Exponent of the constant-elasticity curve
    pub elasticity: f64,
    pub fixed_costs: f64,
    pub variable_costs: f64,
    pub competitor_price: f64,
    pub market_share: f64,
    pub seasonality_factor: f64,
    pub quality_index: f64,
    pub market_growth_rate: f64,
    pub min_margin: f64,
    pub demand_composition: DemandComposition,

    // Competitive landscape
    pub competitor_responsiveness: f64,
    pub competitor_prices_history: Vec<f64>,
    pub market_players: BTreeSet<String>,
    pub segments: BTreeMap<String, Segment>,

    // Inventory
    pub order_cost: f64,
    pub holding_cost_rate: f64,
    /// Replenishment lead time in days
    pub lead_time: f64,

    // Forecasting
    pub historical_prices: Vec<f64>,
    pub historical_demands: Vec<f64>,

    // Risk
    pub risk_tolerance: f64,
    pub confidence_level: f64,
}

fn default_segments() -> BTreeMap<String, Segment> {
    BTreeMap::from([
        ("premium".to_string(), Segment { price_sensitivity: 0.5, size: 0.3 }),
        ("middle".to_string(), Segment { price_sensitivity: 1.0, size: 0.5 }),
        ("budget".to_string(), Segment { price_sensitivity: 1.5, size: 0.2 }),
    ])
}

impl ScenarioParameters {
    /// Scenario with the six required inputs and documented defaults for everything else
    pub fn new(
        initial_price: f64,
        initial_quantity: f64,
        elasticity: f64,
        fixed_costs: f64,
        variable_costs: f64,
        competitor_price: f64,
    ) -> Self {
        ScenarioParameters {
            initial_price,
            initial_quantity,
            elasticity,
            fixed_costs,
            variable_costs,
            competitor_price,
            market_share: 0.5,
            seasonality_factor: 1.0,
            quality_index: 1.0,
            market_growth_rate: 0.02,
            min_margin: 0.1,
            demand_composition: DemandComposition::default(),
            competitor_responsiveness: 0.3,
            competitor_prices_history: Vec::new(),
            market_players: BTreeSet::new(),
            segments: default_segments(),
            order_cost: 100.0,
            holding_cost_rate: 0.1,
            lead_time: 14.0,
            historical_prices: Vec::new(),
            historical_demands: Vec::new(),
            risk_tolerance: 0.5,
            confidence_level: 0.95,
        }
    }

    /// Build a scenario from an inbound JSON bundle.
    ///
    /// Required fields must be present and numeric (numbers or numeric strings).
    /// `default_composition` applies when the bundle does not name one.
    pub fn from_json(data: &Value, default_composition: DemandComposition) -> Result<Self> {
        let obj = data.as_object().ok_or_else(|| {
            PricingError::Validation("Request body must be a JSON object".to_string())
        })?;

        let mut required = [0.0f64; 6];
        for (slot, field) in required.iter_mut().zip(REQUIRED_FIELDS) {
            let value = obj.get(field).ok_or_else(|| {
                PricingError::Validation(format!("Missing required field: {}", field))
            })?;
            *slot = as_number(value).ok_or_else(|| {
                PricingError::Validation(format!("Invalid numeric value for {}", field))
            })?;
        }
        let [price, quantity, elasticity, fixed, variable, competitor] = required;
        let mut params = ScenarioParameters::new(price, quantity, elasticity, fixed, variable, competitor);

        params.market_share = optional_number(obj, "market_share", params.market_share)?;
        params.seasonality_factor = optional_number(obj, "seasonality_factor", params.seasonality_factor)?;
        params.quality_index = optional_number(obj, "quality_index", params.quality_index)?;
        params.market_growth_rate = optional_number(obj, "market_growth_rate", params.market_growth_rate)?;
        params.min_margin = optional_number(obj, "min_margin", params.min_margin)?;
        params.competitor_responsiveness =
            optional_number(obj, "competitor_responsiveness", params.competitor_responsiveness)?;
        params.order_cost = optional_number(obj, "order_cost", params.order_cost)?;
        params.holding_cost_rate = optional_number(obj, "holding_cost_rate", params.holding_cost_rate)?;
        params.lead_time = optional_number(obj, "lead_time", params.lead_time)?;
        params.risk_tolerance = optional_number(obj, "risk_tolerance", params.risk_tolerance)?;
        params.confidence_level = optional_number(obj, "confidence_level", params.confidence_level)?;

        params.demand_composition = optional_field(obj, "demand_composition")?.unwrap_or(default_composition);
        params.competitor_prices_history = optional_series(obj, "competitor_prices_history")?;
        params.historical_prices = optional_series(obj, "historical_prices")?;
        params.historical_demands = optional_series(obj, "historical_demands")?;
        if let Some(players) = optional_field::<BTreeSet<String>>(obj, "market_players")? {
            params.market_players = players;
        }
        if let Some(segments) = optional_field::<BTreeMap<String, Segment>>(obj, "market_segments")? {
            params.segments = segments;
        }

        params.validate_ranges()?;
        Ok(params)
    }

    /// Range checks for fields whose type is a bounded ratio or a non-negative duration
    pub fn validate_ranges(&self) -> Result<()> {
        check_range("market_share", self.market_share, 0.0, 1.0)?;
        check_range("competitor_responsiveness", self.competitor_responsiveness, 0.0, 1.0)?;
        check_range("risk_tolerance", self.risk_tolerance, 0.0, 1.0)?;
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(PricingError::Validation(format!(
                "confidence_level must lie in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.lead_time < 0.0 {
            return Err(PricingError::Validation(format!(
                "lead_time must be non-negative, got {}",
                self.lead_time
            )));
        }
        Ok(())
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn optional_number(obj: &Map<String, Value>, field: &str, default: f64) -> Result<f64> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => as_number(value).ok_or_else(|| {
            PricingError::Validation(format!("Invalid numeric value for {}", field))
        }),
    }
}

fn optional_series(obj: &Map<String, Value>, field: &str) -> Result<Vec<f64>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                as_number(item).ok_or_else(|| {
                    PricingError::Validation(format!("Invalid numeric value in {}", field))
                })
            })
            .collect(),
        Some(_) => Err(PricingError::Validation(format!("{} must be an array of numbers", field))),
    }
}

fn optional_field<T: serde::de::DeserializeOwned>(obj: &Map<String, Value>, field: &str) -> Result<Option<T>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| PricingError::Validation(format!("Invalid value for {}: {}", field, e))),
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if value < min || value > max {
        return Err(PricingError::Validation(format!(
            "{} must lie in [{}, {}], got {}",
            field, min, max, value
        )));
    }
    Ok(())
}

/// Feasible price interval for the optimizer
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PriceBounds {
    pub lower: f64,
    pub upper: f64,
}

impl PriceBounds {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.lower && price <= self.upper
    }
}

/// Outcome of a profit maximization, rounded for presentation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimal_price: f64,
    pub optimal_quantity: f64,
    pub revenue: f64,
    pub profit: f64,
    pub market_share: f64,
    pub break_even_point: f64,
    pub profit_margin: f64,
    pub seasonality_impact: f64,
    pub quality_adjusted_price: f64,
}

/// One period of a demand forecast re-priced by the optimizer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// 1-based index into the forecast horizon
    pub period: usize,
    pub forecasted_demand: f64,
    pub optimal_price: f64,
    pub expected_profit: f64,
}

/// EOQ sizing for a given annual demand
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryPlan {
    pub economic_order_quantity: f64,
    pub reorder_point: f64,
    pub orders_per_year: f64,
    pub annual_order_cost: f64,
    pub annual_holding_cost: f64,
    pub total_inventory_cost: f64,
}

/// Summary statistics over Monte Carlo profit outcomes
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitDistribution {
    pub num_trials: usize,
    pub mean_profit: f64,
    pub std_dev_profit: f64,
    pub min_profit: f64,
    pub max_profit: f64,
    pub percentile_10: f64,
    pub percentile_25: f64,
    pub percentile_50: f64, // Median
    pub percentile_75: f64,
    pub percentile_90: f64,
}

/// Baseline optimum extended with the demand-risk adjustment
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskAnalysis {
    #[serde(flatten)]
    pub result: OptimizationResult,
    pub risk_adjusted_price: f64,
    pub value_at_risk: f64,
    pub price_adjustment: f64,
    #[serde(skip)]
    pub distribution: ProfitDistribution,
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
