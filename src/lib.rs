pub mod api;
pub mod competitor;
pub mod config;
pub mod demand;
pub mod economics;
pub mod error;
pub mod forecast;
pub mod inventory;
pub mod models;
pub mod monte_carlo;
pub mod optimizer;
pub mod reporting;
pub mod sensitivity;

pub use config::{DemandComposition, EngineConfig};
pub use error::{PricingError, Result};
pub use models::{Month, OptimizationResult, ScenarioParameters};
