/// Competitor response prediction
/// Each market player moves part of the way toward our price, plus historical price noise

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::Normal;

use crate::error::{PricingError, Result};
use crate::models::ScenarioParameters;

/// Sample standard deviation of the competitor's observed prices, 0 with fewer than two points
pub fn competitor_price_volatility(params: &ScenarioParameters) -> f64 {
    let history = &params.competitor_prices_history;
    if history.len() < 2 {
        return 0.0;
    }
    let mean = history.iter().sum::<f64>() / history.len() as f64;
    let variance = history.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (history.len() - 1) as f64;
    variance.sqrt()
}

/// Predicted price per market player if we move to `price`
pub fn predict_competitor_response<R: Rng + ?Sized>(
    params: &ScenarioParameters,
    price: f64,
    rng: &mut R,
) -> Result<BTreeMap<String, f64>> {
    let noise = Normal::new(0.0, competitor_price_volatility(params))
        .map_err(|e| PricingError::Domain(format!("invalid competitor price noise: {}", e)))?;
    let pull = params.competitor_responsiveness * (price - params.competitor_price);

    Ok(params
        .market_players
        .iter()
        .map(|player| {
            let predicted = params.competitor_price + pull + rng.sample(noise);
            (player.clone(), predicted.max(0.0))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> ScenarioParameters {
        let mut p = ScenarioParameters::new(50.0, 1000.0, -1.5, 10_000.0, 20.0, 55.0);
        p.market_players = ["acme", "globex"].iter().map(|s| s.to_string()).collect();
        p
    }

    #[test]
    fn test_volatility() {
        let mut p = params();
        assert_eq!(competitor_price_volatility(&p), 0.0);
        p.competitor_prices_history = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sample variance 32/7
        assert!((competitor_price_volatility(&p) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_response_without_history() {
        let p = params();
        let response = predict_competitor_response(&p, 45.0, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(response.len(), 2);
        // 55 + 0.3·(45 − 55)
        for price in response.values() {
            assert!((price - 52.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut p = params();
        p.competitor_prices_history = vec![50.0, 54.0, 57.0, 53.0];
        let first = predict_competitor_response(&p, 60.0, &mut StdRng::seed_from_u64(5)).unwrap();
        let second = predict_competitor_response(&p, 60.0, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_players_no_response() {
        let mut p = params();
        p.market_players.clear();
        assert!(predict_competitor_response(&p, 60.0, &mut StdRng::seed_from_u64(0)).unwrap().is_empty());
    }
}
