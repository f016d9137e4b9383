/// Inventory sizing module
/// Economic order quantity and reorder point for a given annual demand

use crate::error::{PricingError, Result};
use crate::models::{round_to, InventoryPlan, ScenarioParameters};

const DAYS_PER_YEAR: f64 = 365.0;

/// Classic EOQ sizing: `sqrt(2·D·S / H)` with the reorder point covering the lead time
pub fn calculate_optimal_order_quantity(params: &ScenarioParameters, demand: f64) -> Result<InventoryPlan> {
    if !demand.is_finite() || demand < 0.0 {
        return Err(PricingError::Domain(format!(
            "demand must be non-negative, got {}",
            demand
        )));
    }
    if params.holding_cost_rate <= 0.0 {
        return Err(PricingError::Domain(format!(
            "holding_cost_rate must be positive, got {}",
            params.holding_cost_rate
        )));
    }

    let eoq = (2.0 * demand * params.order_cost / params.holding_cost_rate).sqrt();
    let reorder_point = (demand / DAYS_PER_YEAR) * params.lead_time;

    // No demand means no orders at all
    let orders_per_year = if eoq > 0.0 { demand / eoq } else { 0.0 };
    let annual_order_cost = orders_per_year * params.order_cost;
    let annual_holding_cost = eoq / 2.0 * params.holding_cost_rate;

    Ok(InventoryPlan {
        economic_order_quantity: round_to(eoq, 2),
        reorder_point: round_to(reorder_point, 2),
        orders_per_year: round_to(orders_per_year, 2),
        annual_order_cost: round_to(annual_order_cost, 2),
        annual_holding_cost: round_to(annual_holding_cost, 2),
        total_inventory_cost: round_to(annual_order_cost + annual_holding_cost, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ScenarioParameters {
        ScenarioParameters::new(50.0, 1000.0, -1.5, 10_000.0, 20.0, 55.0)
    }

    #[test]
    fn test_eoq_textbook_case() {
        let mut p = params();
        p.order_cost = 50.0;
        p.holding_cost_rate = 2.0;
        p.lead_time = 73.0;
        let plan = calculate_optimal_order_quantity(&p, 1000.0).unwrap();
        // sqrt(2·1000·50 / 2) = sqrt(50000)
        assert!((plan.economic_order_quantity - 223.61).abs() < 1e-9);
        assert!((plan.reorder_point - 200.0).abs() < 1e-9);
        // At the EOQ ordering and holding costs balance
        assert!((plan.annual_order_cost - plan.annual_holding_cost).abs() < 0.02);
    }

    #[test]
    fn test_zero_demand() {
        let plan = calculate_optimal_order_quantity(&params(), 0.0).unwrap();
        assert_eq!(plan.economic_order_quantity, 0.0);
        assert_eq!(plan.total_inventory_cost, 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            calculate_optimal_order_quantity(&params(), -1.0),
            Err(PricingError::Domain(_))
        ));
        let mut p = params();
        p.holding_cost_rate = 0.0;
        assert!(matches!(
            calculate_optimal_order_quantity(&p, 100.0),
            Err(PricingError::Domain(_))
        ));
    }
}
