/// Demand forecasting module
/// Additive Holt-Winters smoothing over historical demand, re-priced period by period

use tracing::{debug, info, warn};

use crate::config::SolverSettings;
use crate::error::{PricingError, Result};
use crate::models::{round_to, ForecastPoint, Month, ScenarioParameters};
use crate::optimizer::calculate_optimal_price;

/// Months per seasonal cycle
pub const SEASON_LENGTH: usize = 12;

/// Full cycles of history required before fitting
pub const MIN_CYCLES: usize = 2;

/// Longest horizon a single forecast may request (ten years of months)
pub const MAX_PERIODS: usize = 120;

const SMOOTHING_GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// Fitted additive trend + seasonal exponential smoothing model
#[derive(Debug, Clone)]
pub struct HoltWinters {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    observations: usize,
    pub sse: f64,
}

impl HoltWinters {
    /// Fit the model, choosing smoothing constants that minimize one-step squared error
    pub fn fit(series: &[f64]) -> Result<Self> {
        let required = SEASON_LENGTH * MIN_CYCLES;
        if series.len() < required {
            return Err(PricingError::InsufficientData {
                required,
                available: series.len(),
            });
        }
        if series.iter().any(|y| !y.is_finite()) {
            return Err(PricingError::Validation(
                "historical_demands must contain only finite values".to_string(),
            ));
        }

        let mut best: Option<HoltWinters> = None;
        for &alpha in &SMOOTHING_GRID {
            for &beta in &SMOOTHING_GRID {
                for &gamma in &SMOOTHING_GRID {
                    let model = Self::smooth(series, alpha, beta, gamma);
                    if best.as_ref().map_or(true, |b| model.sse < b.sse) {
                        best = Some(model);
                    }
                }
            }
        }
        best.ok_or_else(|| PricingError::Internal("no smoothing candidate evaluated".to_string()))
    }

    fn smooth(series: &[f64], alpha: f64, beta: f64, gamma: f64) -> Self {
        let m = SEASON_LENGTH;
        let first_cycle = series[..m].iter().sum::<f64>() / m as f64;
        let second_cycle = series[m..2 * m].iter().sum::<f64>() / m as f64;

        // The first cycle mean sits on the trend line at its centre; seasonals are deviations
        // from that line and the level starts one step before the first observation.
        let mut trend = (second_cycle - first_cycle) / m as f64;
        let centre = (m - 1) as f64 / 2.0;
        let mut seasonals: Vec<f64> = series[..m]
            .iter()
            .enumerate()
            .map(|(i, y)| y - (first_cycle + (i as f64 - centre) * trend))
            .collect();
        let mut level = first_cycle - (centre + 1.0) * trend;
        let mut sse = 0.0;

        for (t, &y) in series.iter().enumerate() {
            let idx = t % m;
            let seasonal = seasonals[idx];
            let error = y - (level + trend + seasonal);
            sse += error * error;

            let previous_level = level;
            level = alpha * (y - seasonal) + (1.0 - alpha) * (level + trend);
            trend = beta * (level - previous_level) + (1.0 - beta) * trend;
            seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * seasonal;
        }

        HoltWinters {
            alpha,
            beta,
            gamma,
            level,
            trend,
            seasonals,
            observations: series.len(),
            sse,
        }
    }

    /// Point forecasts for the next `periods` steps
    pub fn forecast(&self, periods: usize) -> Vec<f64> {
        (1..=periods)
            .map(|h| {
                let seasonal = self.seasonals[(self.observations + h - 1) % SEASON_LENGTH];
                self.level + h as f64 * self.trend + seasonal
            })
            .collect()
    }
}

/// Forecast demand for `periods` months starting at `start_month` and re-optimize each one
pub fn forecast_optimal_prices(
    params: &ScenarioParameters,
    periods: usize,
    start_month: Month,
    settings: &SolverSettings,
) -> Result<Vec<ForecastPoint>> {
    if periods == 0 {
        return Err(PricingError::InvalidParameter("periods must be at least 1".to_string()));
    }
    if periods > MAX_PERIODS {
        return Err(PricingError::InvalidParameter(format!(
            "periods must be at most {}, got {}",
            MAX_PERIODS, periods
        )));
    }
    let model = HoltWinters::fit(&params.historical_demands)?;
    debug!(
        alpha = model.alpha,
        beta = model.beta,
        gamma = model.gamma,
        sse = model.sse,
        "fitted demand smoothing model"
    );

    let mut points = Vec::new();
    for (offset, raw) in model.forecast(periods).into_iter().enumerate() {
        let demand = if raw < 0.0 {
            warn!(period = offset + 1, forecast = raw, "negative demand forecast floored at zero");
            0.0
        } else {
            raw
        };

        let mut scenario = params.clone();
        scenario.initial_quantity = demand;
        let result = calculate_optimal_price(&scenario, start_month.offset(offset), settings)?;

        points.push(ForecastPoint {
            period: offset + 1,
            forecasted_demand: round_to(demand, 2),
            optimal_price: result.optimal_price,
            expected_profit: result.profit,
        });
    }

    info!(periods, start_month = start_month.number(), "demand forecast re-priced");
    Ok(points)
}
