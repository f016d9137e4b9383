/// Monte Carlo risk analysis module
/// Demand-shock trials at the baseline optimal price, Value-at-Risk and the risk-adjusted price

use rand::Rng;
use rand_distr::Normal;
use tracing::{debug, info};

use crate::config::{RiskSettings, SolverSettings};
use crate::economics::profit_function;
use crate::error::{PricingError, Result};
use crate::models::{round_to, Month, ProfitDistribution, RiskAnalysis, ScenarioParameters};
use crate::optimizer::calculate_optimal_price;

/// Percentile `p` (0-100) of sorted samples, linearly interpolated between ranks
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

impl ProfitDistribution {
    /// Summarize trial profits; `profits` is sorted in place
    pub fn from_samples(profits: &mut [f64]) -> Self {
        profits.sort_by(f64::total_cmp);

        let n = profits.len().max(1) as f64;
        let mean_profit = profits.iter().sum::<f64>() / n;
        let variance = profits
            .iter()
            .map(|p| (p - mean_profit).powi(2))
            .sum::<f64>()
            / n;

        ProfitDistribution {
            num_trials: profits.len(),
            mean_profit,
            std_dev_profit: variance.sqrt(),
            min_profit: profits.first().copied().unwrap_or(0.0),
            max_profit: profits.last().copied().unwrap_or(0.0),
            percentile_10: percentile(profits, 10.0),
            percentile_25: percentile(profits, 25.0),
            percentile_50: percentile(profits, 50.0),
            percentile_75: percentile(profits, 75.0),
            percentile_90: percentile(profits, 90.0),
        }
    }
}

/// Profits at `price` over `trials` independent demand shocks of the base quantity.
///
/// Every trial scales the unperturbed `initial_quantity`; shocks never compound.
pub fn simulate_profits<R: Rng + ?Sized>(
    params: &ScenarioParameters,
    price: f64,
    month: Month,
    risk: &RiskSettings,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if risk.trials == 0 {
        return Err(PricingError::InvalidParameter("risk trials must be at least 1".to_string()));
    }
    let shock = Normal::new(1.0, risk.demand_shock_std)
        .map_err(|e| PricingError::Domain(format!("invalid demand shock distribution: {}", e)))?;

    let mut profits = Vec::with_capacity(risk.trials);
    for trial in 0..risk.trials {
        let mut scenario = params.clone();
        // Profit is affine in initial_quantity, so a positive shock leaves the optimal price unchanged
        scenario.initial_quantity = params.initial_quantity * rng.sample(shock);
        let profit = profit_function(&scenario, price, month)?;
        if !profit.is_finite() {
            return Err(PricingError::OptimizationFailure(format!(
                "risk trial {} produced a non-finite profit",
                trial
            )));
        }
        profits.push(profit);
    }
    Ok(profits)
}

/// Optimize, stress the optimum with demand shocks, and shade the price by the tail risk
pub fn calculate_risk_adjusted_price<R: Rng + ?Sized>(
    params: &ScenarioParameters,
    month: Month,
    solver: &SolverSettings,
    risk: &RiskSettings,
    rng: &mut R,
) -> Result<RiskAnalysis> {
    let base = calculate_optimal_price(params, month, solver)?;
    let base_price = base.optimal_price;
    let base_profit = profit_function(params, base_price, month)?;
    if base_profit == 0.0 {
        return Err(PricingError::Domain(
            "risk adjustment undefined: baseline profit is zero".to_string(),
        ));
    }

    let mut profits = simulate_profits(params, base_price, month, risk, rng)?;
    let distribution = ProfitDistribution::from_samples(&mut profits);
    let value_at_risk = percentile(&profits, (1.0 - params.confidence_level) * 100.0);

    let adjusted = base_price * (1.0 + (1.0 - params.risk_tolerance) * (value_at_risk / base_profit));
    debug!(
        base_price,
        base_profit,
        value_at_risk,
        adjusted,
        "risk adjustment computed"
    );
    info!(
        trials = distribution.num_trials,
        mean_profit = distribution.mean_profit,
        "risk analysis complete"
    );

    Ok(RiskAnalysis {
        result: base,
        risk_adjusted_price: round_to(adjusted, 2),
        value_at_risk: round_to(value_at_risk, 2),
        price_adjustment: round_to(adjusted - base_price, 2),
        distribution,
    })
}
