//! Maps a risk tier and commodity perishability to a post-harvest action.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ensure_month, EngineError, Result};
use crate::models::{
    same_commodity, Action, InfrastructureChoice, PerishabilityClass, Recommendation, RiskTier,
};

/// Commodity classification tables and the seasonal policy for the mapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationConfig {
    pub perishability: BTreeMap<String, PerishabilityClass>,
    /// Class used for commodities missing from `perishability`. `None` makes
    /// them an error.
    pub default_class: Option<PerishabilityClass>,
    /// Months where medium risk goes to cold storage instead of a staggered sale.
    pub monsoon_months: BTreeSet<u32>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        let perishability = [
            ("Tomato", PerishabilityClass::High),
            ("Chilli", PerishabilityClass::High),
            ("Onion", PerishabilityClass::Medium),
            ("Potato", PerishabilityClass::Low),
        ]
        .into_iter()
        .map(|(name, class)| (name.to_owned(), class))
        .collect();

        Self {
            perishability,
            default_class: Some(PerishabilityClass::Medium),
            monsoon_months: [6, 7, 8, 9].into_iter().collect(),
        }
    }
}

impl ClassificationConfig {
    pub fn perishability_of(&self, commodity: &str) -> Result<PerishabilityClass> {
        self.perishability
            .iter()
            .find(|(name, _)| same_commodity(name, commodity))
            .map(|(_, class)| *class)
            .or(self.default_class)
            .ok_or_else(|| EngineError::UnknownCommodity {
                commodity: commodity.trim().to_owned(),
                table: "perishability",
            })
    }

    pub fn is_monsoon(&self, month: u32) -> bool {
        self.monsoon_months.contains(&month)
    }

    pub fn validate(&self) -> Result<()> {
        for month in &self.monsoon_months {
            ensure_month(*month)?;
        }
        Ok(())
    }
}

struct Rule {
    action: Action,
    infrastructure: InfrastructureChoice,
    reason: &'static str,
    timeframe: &'static str,
}

pub fn recommend(
    risk: RiskTier,
    commodity: &str,
    target_month: u32,
    perishability: PerishabilityClass,
    config: &ClassificationConfig,
) -> Result<Recommendation> {
    ensure_month(target_month)?;

    let rule = select_rule(risk, perishability, config.is_monsoon(target_month));
    Ok(Recommendation {
        commodity: commodity.trim().to_owned(),
        action: rule.action,
        infrastructure: rule.infrastructure,
        reason: rule.reason.to_owned(),
        timeframe: rule.timeframe.to_owned(),
    })
}

fn select_rule(risk: RiskTier, perishability: PerishabilityClass, monsoon: bool) -> Rule {
    use PerishabilityClass::{High, Low, Medium};

    match (risk, perishability) {
        (RiskTier::HighRisk, High) => Rule {
            action: Action::ProcessOrStore,
            infrastructure: InfrastructureChoice::SolarDryer,
            reason: "Prices are far below the seasonal norm and the produce spoils within days. \
                     Drying converts it into a shelf-stable product that avoids a distress sale.",
            timeframe: "Process within 2-3 days",
        },
        (RiskTier::HighRisk, Medium) => Rule {
            action: Action::ProcessOrStore,
            infrastructure: InfrastructureChoice::ColdStorage,
            reason: "Prices are far below the seasonal norm. The produce keeps well under \
                     refrigeration, so storing it until prices recover avoids a distress sale.",
            timeframe: "Store 2-3 weeks",
        },
        (RiskTier::HighRisk, Low) => Rule {
            action: Action::ProcessOrStore,
            infrastructure: InfrastructureChoice::ColdStorage,
            reason: "Prices are far below the seasonal norm. The produce is durable, so a longer \
                     storage period can wait out the slump.",
            timeframe: "Store 4-6 weeks",
        },
        (RiskTier::MediumRisk, _) if monsoon => Rule {
            action: Action::Hold,
            infrastructure: InfrastructureChoice::ColdStorage,
            reason: "Prices are moderately below the seasonal norm and monsoon humidity raises \
                     spoilage risk for produce held in the open. Hold it in cold storage.",
            timeframe: "Hold 3-4 weeks",
        },
        (RiskTier::MediumRisk, _) => Rule {
            action: Action::Hold,
            infrastructure: InfrastructureChoice::FreshMarketSale,
            reason: "Prices are moderately below the seasonal norm. Staggering sales over the \
                     coming weeks avoids selling the whole harvest at a dip.",
            timeframe: "Stagger sales over 2-3 weeks",
        },
        (RiskTier::Normal, _) => Rule {
            action: Action::Sell,
            infrastructure: InfrastructureChoice::FreshMarketSale,
            reason: "Prices are in line with or above the seasonal norm. Selling fresh now \
                     captures the current price without storage or processing cost.",
            timeframe: "Sell within 1 week",
        },
    }
}
