/// Engine configuration
/// Solver, risk, forecast and sensitivity knobs plus the demand composition policy

use serde::{Deserialize, Serialize};

/// How seasonal demand is modulated after the elasticity curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandComposition {
    /// Multiply by the competitor-driven market share
    #[default]
    CompetitorShare,
    /// Multiply by (1 + market_growth_rate)
    GrowthTrend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Evenly spaced candidates scanned before refinement
    pub grid_points: usize,
    /// Golden-section iteration cap
    pub max_iterations: usize,
    /// Relative bracket width at which refinement stops
    pub tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            grid_points: 64,
            max_iterations: 200,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    pub trials: usize,
    /// Standard deviation of the multiplicative demand shock (mean 1)
    pub demand_shock_std: f64,
    /// Fixed seed for reproducible runs; entropy when absent
    pub seed: Option<u64>,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            trials: 1000,
            demand_shock_std: 0.2,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub default_periods: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self { default_periods: 12 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivitySettings {
    pub default_range_percent: f64,
}

impl Default for SensitivitySettings {
    fn default() -> Self {
        Self {
            default_range_percent: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub demand_composition: DemandComposition,
    pub solver: SolverSettings,
    pub risk: RiskSettings,
    pub forecast: ForecastSettings,
    pub sensitivity: SensitivitySettings,
}

impl EngineConfig {
    /// Layer `config/pricing.*` (optional) and `PRICING__*` environment variables over the defaults
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let s = ::config::Config::builder()
            .add_source(::config::File::with_name("config/pricing").required(false))
            // Eg.. `PRICING__RISK__SEED=7` sets risk.seed
            .add_source(::config::Environment::with_prefix("PRICING").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.demand_composition, DemandComposition::CompetitorShare);
        assert_eq!(config.solver.grid_points, 64);
        assert_eq!(config.risk.trials, 1000);
        assert!(config.risk.seed.is_none());
        assert_eq!(config.forecast.default_periods, 12);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"demand_composition": "growth_trend", "risk": {"seed": 7}}"#,
        )
        .unwrap();
        assert_eq!(config.demand_composition, DemandComposition::GrowthTrend);
        assert_eq!(config.risk.seed, Some(7));
        assert_eq!(config.risk.trials, 1000);
        assert!((config.sensitivity.default_range_percent - 0.2).abs() < 1e-12);
    }
}
