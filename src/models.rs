use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One historical observation from the price dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub commodity: String,
    pub year: i32,
    pub month: u32,
    pub price: f64,
}

impl PriceRecord {
    pub fn new(commodity: impl Into<String>, year: i32, month: u32, price: f64) -> Self {
        Self {
            commodity: commodity.into(),
            year,
            month,
            price,
        }
    }

    pub fn is_for(&self, commodity: &str) -> bool {
        same_commodity(&self.commodity, commodity)
    }
}

/// Commodity identifiers are matched trimmed and ASCII case-insensitive.
pub fn same_commodity(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub average_price: f64,
    pub observations: usize,
}

/// Long-run average price per calendar month for one commodity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalBaseline {
    pub commodity: String,
    pub months: BTreeMap<u32, MonthlyAverage>,
}

impl SeasonalBaseline {
    pub fn average_for(&self, month: u32) -> Option<f64> {
        self.months.get(&month).map(|entry| entry.average_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Normal,
    MediumRisk,
    HighRisk,
}

impl RiskTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::MediumRisk => "medium_risk",
            Self::HighRisk => "high_risk",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "Normal",
            Self::MediumRisk => "Medium risk",
            Self::HighRisk => "High risk",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLabel {
    Favorable,
    Uncertain,
    Dangerous,
}

impl fmt::Display for HealthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Favorable => "Favorable",
            Self::Uncertain => "Uncertain",
            Self::Dangerous => "Dangerous",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub current_price: f64,
    pub seasonal_price: f64,
    pub deviation_pct: f64,
    pub risk_tier: RiskTier,
    pub health_score: u8,
    pub health_label: HealthLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerishabilityClass {
    High,
    Medium,
    Low,
}

impl fmt::Display for PerishabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ProcessOrStore,
    Hold,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ProcessOrStore => "Process or store",
            Self::Hold => "Hold",
            Self::Sell => "Sell",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureChoice {
    SolarDryer,
    ColdStorage,
    FreshMarketSale,
}

impl fmt::Display for InfrastructureChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SolarDryer => "Solar dryer",
            Self::ColdStorage => "Cold storage",
            Self::FreshMarketSale => "Fresh market sale",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub commodity: String,
    pub action: Action,
    pub infrastructure: InfrastructureChoice,
    pub reason: String,
    pub timeframe: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyOption {
    SellNow,
    ColdStorage,
    SolarDrying,
}

impl fmt::Display for StrategyOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SellNow => "Sell now",
            Self::ColdStorage => "Cold storage",
            Self::SolarDrying => "Solar drying",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBenefitEntry {
    pub option: StrategyOption,
    pub net_value: f64,
}

/// Net values of the three strategies, all against `reference_quantity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBenefitComparison {
    pub reference_quantity: f64,
    pub entries: [CostBenefitEntry; 3],
    pub best: StrategyOption,
}

impl CostBenefitComparison {
    pub fn value_of(&self, option: StrategyOption) -> f64 {
        self.entries
            .iter()
            .find(|entry| entry.option == option)
            .map(|entry| entry.net_value)
            .unwrap_or_default()
    }

    pub fn best_entry(&self) -> CostBenefitEntry {
        self.entries
            .iter()
            .copied()
            .find(|entry| entry.option == self.best)
            .unwrap_or(self.entries[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn suggested_for(tier: RiskTier) -> Self {
        match tier {
            RiskTier::HighRisk => Self::High,
            RiskTier::MediumRisk => Self::Medium,
            RiskTier::Normal => Self::Low,
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported urgency `{other}` (expected high|medium|low)"
            ))),
        }
    }
}

/// Payload handed to the buyer-matching service. Submission is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadRequest {
    pub commodity: String,
    pub quantity: f64,
    pub location: String,
    pub infrastructure: InfrastructureChoice,
    pub risk_tier: RiskTier,
    pub urgency: Urgency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commodity_match_ignores_case_and_padding() {
        let record = PriceRecord::new(" Tomato", 2024, 3, 900.0);
        assert!(record.is_for("tomato"));
        assert!(record.is_for("TOMATO "));
        assert!(!record.is_for("onion"));
    }

    #[test]
    fn urgency_parses_intake_values() {
        assert_eq!("High".parse::<Urgency>().ok(), Some(Urgency::High));
        assert_eq!(" low ".parse::<Urgency>().ok(), Some(Urgency::Low));
        assert!(matches!(
            "soon".parse::<Urgency>(),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn urgency_follows_risk_tier() {
        assert_eq!(Urgency::suggested_for(RiskTier::HighRisk), Urgency::High);
        assert_eq!(Urgency::suggested_for(RiskTier::MediumRisk), Urgency::Medium);
        assert_eq!(Urgency::suggested_for(RiskTier::Normal), Urgency::Low);
    }

    #[test]
    fn risk_tier_serializes_snake_case() {
        let json = serde_json::to_string(&RiskTier::MediumRisk).unwrap();
        assert_eq!(json, "\"medium_risk\"");
    }
}
