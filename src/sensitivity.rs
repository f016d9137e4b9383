/// Sensitivity analysis module
/// Sweeps one scalar field across a percentage band, one scenario clone per point

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::SolverSettings;
use crate::error::{PricingError, Result};
use crate::models::{Month, OptimizationResult, ScenarioParameters};
use crate::optimizer::calculate_optimal_price;

/// Number of evaluation points in a sweep
pub const SWEEP_STEPS: usize = 5;

/// Scalar scenario fields that can be swept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunableField {
    InitialPrice,
    InitialQuantity,
    Elasticity,
    FixedCosts,
    VariableCosts,
    CompetitorPrice,
    MarketShare,
    SeasonalityFactor,
    QualityIndex,
    MarketGrowthRate,
    MinMargin,
    CompetitorResponsiveness,
    OrderCost,
    HoldingCostRate,
    LeadTime,
    RiskTolerance,
    ConfidenceLevel,
}

impl TunableField {
    pub const ALL: [TunableField; 17] = [
        TunableField::InitialPrice,
        TunableField::InitialQuantity,
        TunableField::Elasticity,
        TunableField::FixedCosts,
        TunableField::VariableCosts,
        TunableField::CompetitorPrice,
        TunableField::MarketShare,
        TunableField::SeasonalityFactor,
        TunableField::QualityIndex,
        TunableField::MarketGrowthRate,
        TunableField::MinMargin,
        TunableField::CompetitorResponsiveness,
        TunableField::OrderCost,
        TunableField::HoldingCostRate,
        TunableField::LeadTime,
        TunableField::RiskTolerance,
        TunableField::ConfidenceLevel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialPrice => "initial_price",
            Self::InitialQuantity => "initial_quantity",
            Self::Elasticity => "elasticity",
            Self::FixedCosts => "fixed_costs",
            Self::VariableCosts => "variable_costs",
            Self::CompetitorPrice => "competitor_price",
            Self::MarketShare => "market_share",
            Self::SeasonalityFactor => "seasonality_factor",
            Self::QualityIndex => "quality_index",
            Self::MarketGrowthRate => "market_growth_rate",
            Self::MinMargin => "min_margin",
            Self::CompetitorResponsiveness => "competitor_responsiveness",
            Self::OrderCost => "order_cost",
            Self::HoldingCostRate => "holding_cost_rate",
            Self::LeadTime => "lead_time",
            Self::RiskTolerance => "risk_tolerance",
            Self::ConfidenceLevel => "confidence_level",
        }
    }

    pub fn get(&self, params: &ScenarioParameters) -> f64 {
        match self {
            Self::InitialPrice => params.initial_price,
            Self::InitialQuantity => params.initial_quantity,
            Self::Elasticity => params.elasticity,
            Self::FixedCosts => params.fixed_costs,
            Self::VariableCosts => params.variable_costs,
            Self::CompetitorPrice => params.competitor_price,
            Self::MarketShare => params.market_share,
            Self::SeasonalityFactor => params.seasonality_factor,
            Self::QualityIndex => params.quality_index,
            Self::MarketGrowthRate => params.market_growth_rate,
            Self::MinMargin => params.min_margin,
            Self::CompetitorResponsiveness => params.competitor_responsiveness,
            Self::OrderCost => params.order_cost,
            Self::HoldingCostRate => params.holding_cost_rate,
            Self::LeadTime => params.lead_time,
            Self::RiskTolerance => params.risk_tolerance,
            Self::ConfidenceLevel => params.confidence_level,
        }
    }

    /// Copy of `params` with this field replaced by `value`
    pub fn with_value(&self, params: &ScenarioParameters, value: f64) -> ScenarioParameters {
        let mut adjusted = params.clone();
        *self.slot(&mut adjusted) = value;
        adjusted
    }

    fn slot<'a>(&self, params: &'a mut ScenarioParameters) -> &'a mut f64 {
        match self {
            Self::InitialPrice => &mut params.initial_price,
            Self::InitialQuantity => &mut params.initial_quantity,
            Self::Elasticity => &mut params.elasticity,
            Self::FixedCosts => &mut params.fixed_costs,
            Self::VariableCosts => &mut params.variable_costs,
            Self::CompetitorPrice => &mut params.competitor_price,
            Self::MarketShare => &mut params.market_share,
            Self::SeasonalityFactor => &mut params.seasonality_factor,
            Self::QualityIndex => &mut params.quality_index,
            Self::MarketGrowthRate => &mut params.market_growth_rate,
            Self::MinMargin => &mut params.min_margin,
            Self::CompetitorResponsiveness => &mut params.competitor_responsiveness,
            Self::OrderCost => &mut params.order_cost,
            Self::HoldingCostRate => &mut params.holding_cost_rate,
            Self::LeadTime => &mut params.lead_time,
            Self::RiskTolerance => &mut params.risk_tolerance,
            Self::ConfidenceLevel => &mut params.confidence_level,
        }
    }
}

impl fmt::Display for TunableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TunableField {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        // The wire bundle calls elasticity `price_elasticity`
        if s == "price_elasticity" {
            return Ok(TunableField::Elasticity);
        }
        TunableField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| {
                PricingError::InvalidParameter(format!("'{}' is not a tunable numeric field", s))
            })
    }
}

/// `SWEEP_STEPS` evenly spaced values over `[base·(1−range), base·(1+range)]`
pub fn sweep_values(base: f64, range_percent: f64) -> Vec<f64> {
    let start = base * (1.0 - range_percent);
    let end = base * (1.0 + range_percent);
    let step = (end - start) / (SWEEP_STEPS - 1) as f64;
    (0..SWEEP_STEPS).map(|i| start + step * i as f64).collect()
}

/// Re-optimize with `variable` swept across ±`range_percent`, results in sweep order
pub fn sensitivity_analysis(
    params: &ScenarioParameters,
    variable: &str,
    range_percent: f64,
    month: Month,
    settings: &SolverSettings,
) -> Result<Vec<OptimizationResult>> {
    let field: TunableField = variable.parse()?;
    if !range_percent.is_finite() {
        return Err(PricingError::InvalidParameter(format!(
            "range_percent must be finite, got {}",
            range_percent
        )));
    }

    let base = field.get(params);
    let results = sweep_values(base, range_percent)
        .into_iter()
        .map(|value| {
            debug!(field = field.name(), value, "sensitivity sweep point");
            calculate_optimal_price(&field.with_value(params, value), month, settings)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(field = field.name(), base, points = results.len(), "sensitivity sweep complete");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> ScenarioParameters {
        ScenarioParameters::new(50.0, 1000.0, -1.5, 10_000.0, 20.0, 55.0)
    }

    fn march() -> Month {
        Month::new(3).unwrap()
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in TunableField::ALL {
            assert_eq!(field.name().parse::<TunableField>().unwrap(), field);
        }
        assert_eq!("price_elasticity".parse::<TunableField>().unwrap(), TunableField::Elasticity);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = sensitivity_analysis(&params(), "segments", 0.2, march(), &SolverSettings::default())
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidParameter(_)));
    }

    #[test]
    fn test_sweep_values() {
        let values = sweep_values(100.0, 0.2);
        assert_eq!(values.len(), 5);
        assert!((values[0] - 80.0).abs() < 1e-9);
        assert!((values[2] - 100.0).abs() < 1e-9);
        assert!((values[4] - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_cost_sweep_lowers_profit() {
        let results =
            sensitivity_analysis(&params(), "fixed_costs", 0.2, march(), &SolverSettings::default()).unwrap();
        assert_eq!(results.len(), 5);
        // Fixed costs do not move the optimum, only the profit level
        for pair in results.windows(2) {
            assert!(pair[1].profit < pair[0].profit);
            assert!((pair[1].optimal_price - pair[0].optimal_price).abs() < 0.02);
        }
    }

    #[test]
    fn test_scenario_unchanged_after_every_sweep() {
        let original = params();
        let snapshot = original.clone();
        for field in TunableField::ALL {
            let _ = sensitivity_analysis(&original, field.name(), 0.2, march(), &SolverSettings::default());
            assert_eq!(original, snapshot, "field {} leaked into the scenario", field);
        }
    }

    #[test]
    fn test_scenario_unchanged_when_sweep_fails_midway() {
        let mut original = params();
        original.min_margin = 0.5;
        original.variable_costs = 70.0;
        // lower bound = 2·variable_costs; infeasible once variable_costs passes 75
        let snapshot = original.clone();
        let result = sensitivity_analysis(&original, "variable_costs", 0.2, march(), &SolverSettings::default());
        assert!(matches!(result, Err(PricingError::Domain(_))));
        assert_eq!(original, snapshot);
        assert_eq!(original.variable_costs, 70.0);
    }

    proptest! {
        #[test]
        fn prop_sweep_leaves_scenario_untouched(
            field in proptest::sample::select(TunableField::ALL.to_vec()),
            range in 0.0f64..0.5,
            month in 1u32..=12,
        ) {
            let original = params();
            let snapshot = original.clone();
            let _ = sensitivity_analysis(
                &original,
                field.name(),
                range,
                Month::new(month).unwrap(),
                &SolverSettings::default(),
            );
            prop_assert_eq!(original, snapshot);
        }
    }
}
