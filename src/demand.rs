/// Market response model
/// Demand curve, competitor-driven market share, quality perception and seasonality

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::config::DemandComposition;
use crate::error::{PricingError, Result};
use crate::models::{Month, ScenarioParameters};

/// Price as perceived after normalizing by the quality index
pub fn quality_adjusted_price(params: &ScenarioParameters, price: f64) -> Result<f64> {
    if params.quality_index == 0.0 {
        return Err(PricingError::Domain("quality_index must be non-zero".to_string()));
    }
    Ok(price / params.quality_index)
}

/// Scale demand by the sinusoidal seasonal cycle for `month`
pub fn seasonal_demand_adjustment(params: &ScenarioParameters, base_demand: f64, month: Month) -> f64 {
    let phase = 2.0 * PI * month.number() as f64 / 12.0;
    base_demand * (1.0 + params.seasonality_factor * phase.sin())
}

/// Market share at `price` relative to the competitor, clamped to [0, 1].
/// Pricing at the competitor's level reproduces the baseline share.
pub fn competitor_impact(params: &ScenarioParameters, price: f64) -> Result<f64> {
    if params.competitor_price == 0.0 {
        return Err(PricingError::Domain("competitor_price must be non-zero".to_string()));
    }
    let price_ratio = price / params.competitor_price;
    let share = params.market_share * (2.0 - price_ratio);
    Ok(share.clamp(0.0, 1.0))
}

/// Quantity demanded at `price` during `month`
pub fn demand_function(params: &ScenarioParameters, price: f64, month: Month) -> Result<f64> {
    if price <= 0.0 {
        return Err(PricingError::Domain(format!("price must be positive, got {}", price)));
    }
    let perceived = quality_adjusted_price(params, price)?;
    let base_demand = params.initial_quantity * (params.initial_price / perceived).powf(params.elasticity);
    let seasonal_demand = seasonal_demand_adjustment(params, base_demand, month);

    let modulation = match params.demand_composition {
        DemandComposition::CompetitorShare => competitor_impact(params, price)?,
        DemandComposition::GrowthTrend => 1.0 + params.market_growth_rate,
    };
    Ok(seasonal_demand * modulation)
}

/// Demand per customer segment at `price`
pub fn segment_demand(params: &ScenarioParameters, price: f64) -> Result<BTreeMap<String, f64>> {
    if price <= 0.0 {
        return Err(PricingError::Domain(format!("price must be positive, got {}", price)));
    }
    let ratio = params.initial_price / price;
    Ok(params
        .segments
        .iter()
        .map(|(name, segment)| {
            let exponent = params.elasticity * segment.price_sensitivity;
            (name.clone(), params.initial_quantity * segment.size * ratio.powf(exponent))
        })
        .collect())
}
