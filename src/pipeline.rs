use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::{build_baseline, trailing_price, DEFAULT_TRAILING_WINDOW};
use crate::cost_benefit::{compare, EconomicConfig};
use crate::error::{ensure_month, EngineError, Result};
use crate::models::{
    CostBenefitComparison, PerishabilityClass, PriceRecord, Recommendation, RiskAssessment,
    SeasonalBaseline,
};
use crate::recommend::{recommend, ClassificationConfig};
use crate::risk::classify;

/// Everything the engine needs besides the records and the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub trailing_window: usize,
    pub classification: ClassificationConfig,
    pub economics: EconomicConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trailing_window: DEFAULT_TRAILING_WINDOW,
            classification: ClassificationConfig::default(),
            economics: EconomicConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trailing_window == 0 {
            return Err(EngineError::InvalidInput(
                "trailing window must be at least 1".to_owned(),
            ));
        }
        self.classification.validate()?;
        self.economics.validate()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub commodity: String,
    pub target_month: u32,
    /// Explicit current price. When absent the trailing-window mean is used.
    pub current_price: Option<f64>,
}

impl AnalysisRequest {
    pub fn new(commodity: impl Into<String>, target_month: u32) -> Self {
        Self {
            commodity: commodity.into(),
            target_month,
            current_price: None,
        }
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub commodity: String,
    pub target_month: u32,
    pub perishability: PerishabilityClass,
    pub baseline: SeasonalBaseline,
    pub assessment: RiskAssessment,
    pub recommendation: Recommendation,
    pub comparison: CostBenefitComparison,
}

/// Runs baseline, classification, recommendation and cost-benefit for one
/// commodity. The first failing stage ends the run.
pub fn analyze(
    records: &[PriceRecord],
    request: &AnalysisRequest,
    config: &EngineConfig,
) -> Result<Analysis> {
    let commodity = request.commodity.trim();
    ensure_month(request.target_month)?;
    config.validate()?;

    let baseline = build_baseline(records, commodity)?;
    debug!(
        commodity,
        months = baseline.months.len(),
        "built seasonal baseline"
    );

    let current_price = match request.current_price {
        Some(price) => price,
        None => trailing_price(records, commodity, config.trailing_window)?,
    };

    let assessment = classify(current_price, &baseline, request.target_month)?;
    debug!(
        commodity,
        month = request.target_month,
        current_price,
        deviation_pct = assessment.deviation_pct,
        tier = assessment.risk_tier.as_str(),
        health_score = assessment.health_score,
        "classified price risk"
    );

    let perishability = config.classification.perishability_of(commodity)?;
    let recommendation = recommend(
        assessment.risk_tier,
        commodity,
        request.target_month,
        perishability,
        &config.classification,
    )?;

    let sell_now_price = config.economics.per_unit_price(current_price);
    let comparison = compare(sell_now_price, commodity, &config.economics)?;
    debug!(
        commodity,
        best = %comparison.best,
        infrastructure = %recommendation.infrastructure,
        "compared post-harvest strategies"
    );

    Ok(Analysis {
        commodity: baseline.commodity.clone(),
        target_month: request.target_month,
        perishability,
        baseline,
        assessment,
        recommendation,
        comparison,
    })
}
