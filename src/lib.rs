//! Seasonal risk and recommendation engine for post-harvest decisions.
//!
//! Given a commodity's price history and a calendar month, the engine builds a
//! seasonal baseline, scores current price health against it, recommends an
//! action (sell fresh, cold-store, or solar-dry) and compares the payoff of
//! each strategy. Every operation is a pure function of its inputs.

pub mod baseline;
pub mod config;
pub mod cost_benefit;
pub mod error;
pub mod lead;
pub mod models;
pub mod pipeline;
pub mod recommend;
pub mod risk;

pub use baseline::{build_baseline, trailing_price};
pub use cost_benefit::{compare, EconomicConfig};
pub use error::{EngineError, Result};
pub use models::{
    Action, CostBenefitComparison, CostBenefitEntry, HealthLabel, InfrastructureChoice,
    LeadRequest, PerishabilityClass, PriceRecord, Recommendation, RiskAssessment, RiskTier,
    SeasonalBaseline, StrategyOption, Urgency,
};
pub use pipeline::{analyze, Analysis, AnalysisRequest, EngineConfig};
pub use recommend::{recommend, ClassificationConfig};
pub use risk::classify;
