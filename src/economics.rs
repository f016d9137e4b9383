/// Economic evaluator
/// Revenue, cost and profit on top of the demand model, plus the feasible price box

use crate::demand::demand_function;
use crate::error::{PricingError, Result};
use crate::models::{Month, PriceBounds, ScenarioParameters};

/// Smallest price the optimizer may consider
pub const PRICE_FLOOR: f64 = 0.01;

/// Upper bound as a multiple of the initial price
pub const MAX_PRICE_MULTIPLE: f64 = 3.0;

pub fn revenue_function(params: &ScenarioParameters, price: f64, month: Month) -> Result<f64> {
    Ok(price * demand_function(params, price, month)?)
}

pub fn cost_function(params: &ScenarioParameters, quantity: f64) -> f64 {
    params.fixed_costs + params.variable_costs * quantity
}

pub fn profit_function(params: &ScenarioParameters, price: f64, month: Month) -> Result<f64> {
    let quantity = demand_function(params, price, month)?;
    Ok(price * quantity - cost_function(params, quantity))
}

/// Price interval honoring the minimum margin on variable cost
pub fn calculate_price_bounds(params: &ScenarioParameters) -> Result<PriceBounds> {
    if !(0.0..1.0).contains(&params.min_margin) {
        return Err(PricingError::Domain(format!(
            "min_margin must lie in [0, 1), got {}",
            params.min_margin
        )));
    }
    let lower = (params.variable_costs / (1.0 - params.min_margin)).max(PRICE_FLOOR);
    let upper = params.initial_price * MAX_PRICE_MULTIPLE;

    if lower > upper {
        return Err(PricingError::Domain(format!(
            "infeasible price bounds: minimum price {:.2} exceeds maximum price {:.2}",
            lower, upper
        )));
    }
    Ok(PriceBounds { lower, upper })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ScenarioParameters {
        ScenarioParameters::new(50.0, 1000.0, -1.5, 10_000.0, 20.0, 55.0)
    }

    #[test]
    fn test_cost_function() {
        assert_eq!(cost_function(&params(), 100.0), 12_000.0);
    }

    #[test]
    fn test_profit_is_revenue_minus_cost() {
        let p = params();
        let month = Month::new(3).unwrap();
        let quantity = demand_function(&p, 60.0, month).unwrap();
        let revenue = revenue_function(&p, 60.0, month).unwrap();
        let profit = profit_function(&p, 60.0, month).unwrap();
        assert!((profit - (revenue - cost_function(&p, quantity))).abs() < 1e-6);
    }

    #[test]
    fn test_default_bounds() {
        let bounds = calculate_price_bounds(&params()).unwrap();
        assert!((bounds.lower - 20.0 / 0.9).abs() < 1e-9);
        assert_eq!(bounds.upper, 150.0);
    }

    #[test]
    fn test_extreme_margin_is_infeasible() {
        let mut p = params();
        p.min_margin = 0.99;
        // 20 / 0.01 = 2000 > 150
        assert!(matches!(calculate_price_bounds(&p), Err(PricingError::Domain(_))));

        p.initial_price = 1000.0;
        let bounds = calculate_price_bounds(&p).unwrap();
        assert!((bounds.lower - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_margin_of_one_rejected() {
        let mut p = params();
        p.min_margin = 1.0;
        assert!(matches!(calculate_price_bounds(&p), Err(PricingError::Domain(_))));
    }

    #[test]
    fn test_zero_variable_cost_floors_lower_bound() {
        let mut p = params();
        p.variable_costs = 0.0;
        assert_eq!(calculate_price_bounds(&p).unwrap().lower, PRICE_FLOOR);
    }
}
