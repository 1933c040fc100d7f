use crate::error::{ensure_month, ensure_price, EngineError, Result};
use crate::models::{HealthLabel, RiskAssessment, RiskTier, SeasonalBaseline};

pub const HIGH_RISK_BELOW_PCT: f64 = -30.0;
pub const MEDIUM_RISK_BELOW_PCT: f64 = -15.0;
pub const HEALTH_PIVOT: f64 = 60.0;
pub const DANGEROUS_BELOW_SCORE: u8 = 35;
pub const FAVORABLE_FROM_SCORE: u8 = 60;

/// Scores `current_price` against the seasonal norm for `target_month`.
pub fn classify(
    current_price: f64,
    baseline: &SeasonalBaseline,
    target_month: u32,
) -> Result<RiskAssessment> {
    ensure_month(target_month)?;
    ensure_price("current price", current_price)?;

    let seasonal_price =
        baseline
            .average_for(target_month)
            .ok_or_else(|| EngineError::MissingSeasonalData {
                commodity: baseline.commodity.clone(),
                month: target_month,
            })?;

    let deviation_pct = deviation_pct(current_price, seasonal_price).ok_or_else(|| {
        EngineError::DivisionByZero {
            commodity: baseline.commodity.clone(),
            month: target_month,
        }
    })?;

    let health_score = health_score(deviation_pct);

    Ok(RiskAssessment {
        current_price,
        seasonal_price,
        deviation_pct,
        risk_tier: tier_for(deviation_pct),
        health_score,
        health_label: label_for(health_score),
    })
}

/// Percentage difference from the seasonal price. `None` when that price is zero.
pub fn deviation_pct(current_price: f64, seasonal_price: f64) -> Option<f64> {
    if seasonal_price == 0.0 {
        return None;
    }
    Some((current_price - seasonal_price) / seasonal_price * 100.0)
}

pub fn tier_for(deviation_pct: f64) -> RiskTier {
    if deviation_pct < HIGH_RISK_BELOW_PCT {
        RiskTier::HighRisk
    } else if deviation_pct < MEDIUM_RISK_BELOW_PCT {
        RiskTier::MediumRisk
    } else {
        RiskTier::Normal
    }
}

pub fn health_score(deviation_pct: f64) -> u8 {
    (HEALTH_PIVOT + deviation_pct).round().clamp(0.0, 100.0) as u8
}

pub fn label_for(health_score: u8) -> HealthLabel {
    match health_score {
        score if score < DANGEROUS_BELOW_SCORE => HealthLabel::Dangerous,
        score if score < FAVORABLE_FROM_SCORE => HealthLabel::Uncertain,
        _ => HealthLabel::Favorable,
    }
}
