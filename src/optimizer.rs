/// Optimization module for finding the profit-maximizing price
/// A coarse candidate scan over the feasible box, refined by golden-section search

use tracing::{debug, warn};

use crate::config::SolverSettings;
use crate::demand::{competitor_impact, demand_function, quality_adjusted_price, seasonal_demand_adjustment};
use crate::economics::{calculate_price_bounds, profit_function, revenue_function};
use crate::error::{PricingError, Result};
use crate::models::{round_to, Month, OptimizationResult, ScenarioParameters};

/// 1/φ, the golden-section shrink factor
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Location and value of a maximum found by [`maximize_bounded`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optimum {
    pub x: f64,
    pub value: f64,
    pub iterations: usize,
}

fn evaluate<F>(objective: &mut F, x: f64) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    let value = objective(x)?;
    if !value.is_finite() {
        return Err(PricingError::OptimizationFailure(format!(
            "objective is not finite at {}",
            x
        )));
    }
    Ok(value)
}

/// Maximize a scalar objective over `[lower, upper]`.
///
/// Candidates are spaced evenly across the box (the initial guess is scored too), then
/// the bracket around the best candidate is narrowed by golden-section search until its
/// width drops below `tolerance·(1+|x|)`. Hitting `max_iterations` first is a failure.
pub fn maximize_bounded<F>(
    mut objective: F,
    lower: f64,
    upper: f64,
    initial_guess: f64,
    settings: &SolverSettings,
) -> Result<Optimum>
where
    F: FnMut(f64) -> Result<f64>,
{
    if !lower.is_finite() || !upper.is_finite() || lower > upper {
        return Err(PricingError::OptimizationFailure(format!(
            "invalid search interval [{}, {}]",
            lower, upper
        )));
    }
    if lower == upper {
        let value = evaluate(&mut objective, lower)?;
        return Ok(Optimum { x: lower, value, iterations: 0 });
    }

    let num_candidates = settings.grid_points.max(2);
    let step = (upper - lower) / (num_candidates - 1) as f64;

    let guess = initial_guess.clamp(lower, upper);
    let mut best_x = guess;
    let mut best_value = evaluate(&mut objective, guess)?;

    for i in 0..num_candidates {
        let candidate = lower + step * i as f64;
        let value = evaluate(&mut objective, candidate)?;
        if value > best_value {
            best_value = value;
            best_x = candidate;
        }
    }

    // Golden-section refinement inside the neighbouring candidates
    let mut a = (best_x - step).max(lower);
    let mut b = (best_x + step).min(upper);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = evaluate(&mut objective, c)?;
    let mut fd = evaluate(&mut objective, d)?;

    let mut iterations = 0;
    while (b - a) > settings.tolerance * (1.0 + best_x.abs()) {
        if iterations >= settings.max_iterations {
            return Err(PricingError::OptimizationFailure(format!(
                "no convergence within {} iterations (bracket [{}, {}])",
                settings.max_iterations, a, b
            )));
        }
        if fc > fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = evaluate(&mut objective, c)?;
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = evaluate(&mut objective, d)?;
        }
        iterations += 1;
    }

    let midpoint = 0.5 * (a + b);
    let refined = evaluate(&mut objective, midpoint)?;
    if refined >= best_value {
        best_value = refined;
        best_x = midpoint;
    }

    let clamped = best_x.clamp(lower, upper);
    if clamped != best_x {
        warn!(x = best_x, lower, upper, "optimizer overshot bounds, clamping");
        best_value = evaluate(&mut objective, clamped)?;
    }

    Ok(Optimum {
        x: clamped,
        value: best_value,
        iterations,
    })
}

/// Find the profit-maximizing price for `month` and derive the reported metrics
pub fn calculate_optimal_price(
    params: &ScenarioParameters,
    month: Month,
    settings: &SolverSettings,
) -> Result<OptimizationResult> {
    let bounds = calculate_price_bounds(params)?;
    let optimum = maximize_bounded(
        |price| profit_function(params, price, month),
        bounds.lower,
        bounds.upper,
        params.initial_price,
        settings,
    )?;

    let optimal_price = optimum.x;
    let unit_margin = optimal_price - params.variable_costs;
    if unit_margin == 0.0 {
        return Err(PricingError::Domain(
            "break-even point undefined: optimal price equals variable cost".to_string(),
        ));
    }

    let optimal_quantity = demand_function(params, optimal_price, month)?;
    let revenue = revenue_function(params, optimal_price, month)?;
    let market_share = competitor_impact(params, optimal_price)?;
    let perceived = quality_adjusted_price(params, optimal_price)?;

    debug!(
        price = optimal_price,
        profit = optimum.value,
        iterations = optimum.iterations,
        month = month.number(),
        "optimal price found"
    );

    Ok(OptimizationResult {
        optimal_price: round_to(optimal_price, 2),
        optimal_quantity: round_to(optimal_quantity, 2),
        revenue: round_to(revenue, 2),
        profit: round_to(optimum.value, 2),
        market_share: round_to(market_share, 3),
        break_even_point: round_to(params.fixed_costs / unit_margin, 2),
        profit_margin: round_to(unit_margin / optimal_price, 3),
        seasonality_impact: round_to(seasonal_demand_adjustment(params, 1.0, month), 3),
        quality_adjusted_price: round_to(perceived, 2),
    })
}
