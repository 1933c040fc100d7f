//! Linear cost-benefit models for selling now, cold storage and solar drying.
//!
//! Every net value is computed for `reference_quantity` units of fresh
//! produce, so the three options are directly comparable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_price, EngineError, Result};
use crate::models::{same_commodity, CostBenefitComparison, CostBenefitEntry, StrategyOption};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicConfig {
    pub reference_quantity: f64,
    pub cold_storage_cost_per_day_per_unit: f64,
    pub storage_days: u32,
    pub expected_price_recovery_pct: f64,
    pub drying_cost_per_unit: f64,
    /// Dried mass obtained per unit of fresh mass.
    pub dry_yield_ratio: BTreeMap<String, f64>,
    /// Price per unit of dried product.
    pub dried_market_price: BTreeMap<String, f64>,
    /// Number of units a dataset price is quoted for. `None` means dataset
    /// prices are quoted per `reference_quantity`.
    pub price_basis: Option<f64>,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            reference_quantity: 100.0,
            cold_storage_cost_per_day_per_unit: 1.5,
            storage_days: 14,
            expected_price_recovery_pct: 18.0,
            drying_cost_per_unit: 4.0,
            dry_yield_ratio: table(&[
                ("Tomato", 0.08),
                ("Onion", 0.15),
                ("Chilli", 0.25),
                ("Potato", 0.20),
            ]),
            dried_market_price: table(&[
                ("Tomato", 320.0),
                ("Onion", 210.0),
                ("Chilli", 480.0),
                ("Potato", 160.0),
            ]),
            price_basis: None,
        }
    }
}

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(name, value)| ((*name).to_owned(), *value))
        .collect()
}

fn lookup(table: &BTreeMap<String, f64>, commodity: &str, name: &'static str) -> Result<f64> {
    table
        .iter()
        .find(|(key, _)| same_commodity(key, commodity))
        .map(|(_, value)| *value)
        .ok_or_else(|| EngineError::UnknownCommodity {
            commodity: commodity.trim().to_owned(),
            table: name,
        })
}

impl EconomicConfig {
    pub fn dry_yield_for(&self, commodity: &str) -> Result<f64> {
        lookup(&self.dry_yield_ratio, commodity, "dry yield")
    }

    pub fn dried_price_for(&self, commodity: &str) -> Result<f64> {
        lookup(&self.dried_market_price, commodity, "dried market price")
    }

    pub fn quoted_basis(&self) -> f64 {
        self.price_basis.unwrap_or(self.reference_quantity)
    }

    /// Converts a dataset price into a per-unit price.
    pub fn per_unit_price(&self, quoted_price: f64) -> f64 {
        quoted_price / self.quoted_basis()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.reference_quantity.is_finite() && self.reference_quantity > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "reference quantity must be positive, got {}",
                self.reference_quantity
            )));
        }
        if let Some(basis) = self.price_basis {
            if !(basis.is_finite() && basis > 0.0) {
                return Err(EngineError::InvalidInput(format!(
                    "price basis must be positive, got {basis}"
                )));
            }
        }
        ensure_price("cold storage cost", self.cold_storage_cost_per_day_per_unit)?;
        ensure_price("drying cost", self.drying_cost_per_unit)?;
        if !self.expected_price_recovery_pct.is_finite() {
            return Err(EngineError::InvalidInput(
                "expected price recovery must be finite".to_owned(),
            ));
        }
        for (commodity, ratio) in &self.dry_yield_ratio {
            if !(ratio.is_finite() && *ratio >= 0.0 && *ratio <= 1.0) {
                return Err(EngineError::InvalidInput(format!(
                    "dry yield ratio for `{commodity}` must be within 0..=1, got {ratio}"
                )));
            }
        }
        for (commodity, price) in &self.dried_market_price {
            ensure_price(&format!("dried market price for `{commodity}`"), *price)?;
        }
        Ok(())
    }
}

pub fn sell_now_value(sell_now_price: f64, config: &EconomicConfig) -> f64 {
    sell_now_price * config.reference_quantity
}

pub fn cold_storage_value(sell_now_price: f64, config: &EconomicConfig) -> f64 {
    let quantity = config.reference_quantity;
    let recovered = sell_now_price * (1.0 + config.expected_price_recovery_pct / 100.0) * quantity;
    let storage =
        config.cold_storage_cost_per_day_per_unit * f64::from(config.storage_days) * quantity;
    recovered - storage
}

pub fn solar_drying_value(commodity: &str, config: &EconomicConfig) -> Result<f64> {
    let quantity = config.reference_quantity;
    let dried_mass = quantity * config.dry_yield_for(commodity)?;
    let revenue = dried_mass * config.dried_price_for(commodity)?;
    Ok(revenue - quantity * config.drying_cost_per_unit)
}

/// `sell_now_price` is per unit. Ties go to the earlier option in
/// SellNow, ColdStorage, SolarDrying order.
pub fn compare(
    sell_now_price: f64,
    commodity: &str,
    config: &EconomicConfig,
) -> Result<CostBenefitComparison> {
    ensure_price("sell-now price", sell_now_price)?;
    config.validate()?;

    let entries = [
        CostBenefitEntry {
            option: StrategyOption::SellNow,
            net_value: sell_now_value(sell_now_price, config),
        },
        CostBenefitEntry {
            option: StrategyOption::ColdStorage,
            net_value: cold_storage_value(sell_now_price, config),
        },
        CostBenefitEntry {
            option: StrategyOption::SolarDrying,
            net_value: solar_drying_value(commodity, config)?,
        },
    ];

    let mut best = entries[0];
    for entry in &entries[1..] {
        if entry.net_value > best.net_value {
            best = *entry;
        }
    }

    Ok(CostBenefitComparison {
        reference_quantity: config.reference_quantity,
        entries,
        best: best.option,
    })
}
