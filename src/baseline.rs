use std::collections::BTreeMap;

use crate::error::{EngineError, Result};
use crate::models::{MonthlyAverage, PriceRecord, SeasonalBaseline};

pub const DEFAULT_TRAILING_WINDOW: usize = 6;

/// Averages every year's observations per calendar month for one commodity.
/// Months with no observations are left out.
pub fn build_baseline(records: &[PriceRecord], commodity: &str) -> Result<SeasonalBaseline> {
    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for record in records.iter().filter(|record| record.is_for(commodity)) {
        let entry = sums.entry(record.month).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }

    if sums.is_empty() {
        return Err(EngineError::EmptyDataset(commodity.trim().to_owned()));
    }

    let months = sums
        .into_iter()
        .map(|(month, (total, count))| {
            (
                month,
                MonthlyAverage {
                    average_price: total / count as f64,
                    observations: count,
                },
            )
        })
        .collect();

    Ok(SeasonalBaseline {
        commodity: commodity.trim().to_owned(),
        months,
    })
}

/// Mean of the chronologically last `min(window, N)` records for the commodity.
/// Records sharing a (year, month) keep their input order.
pub fn trailing_price(records: &[PriceRecord], commodity: &str, window: usize) -> Result<f64> {
    if window == 0 {
        return Err(EngineError::InvalidInput(
            "trailing window must be at least 1".to_owned(),
        ));
    }

    let mut matching: Vec<&PriceRecord> = records
        .iter()
        .filter(|record| record.is_for(commodity))
        .collect();

    if matching.is_empty() {
        return Err(EngineError::EmptyDataset(commodity.trim().to_owned()));
    }

    matching.sort_by_key(|record| (record.year, record.month));
    let take = window.min(matching.len());
    let tail = &matching[matching.len() - take..];
    let total: f64 = tail.iter().map(|record| record.price).sum();

    Ok(total / take as f64)
}
