use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no price records for commodity `{0}`")]
    EmptyDataset(String),
    #[error("seasonal baseline for `{commodity}` has no entry for month {month}")]
    MissingSeasonalData { commodity: String, month: u32 },
    #[error("seasonal price for `{commodity}` in month {month} is zero; deviation is undefined")]
    DivisionByZero { commodity: String, month: u32 },
    #[error("commodity `{commodity}` is missing from the {table} table")]
    UnknownCommodity { commodity: String, table: &'static str },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyDataset(_) => {
                "No historical price data exists for this commodity, so no recommendation can be made."
            }
            Self::MissingSeasonalData { .. } => {
                "There is no historical price data for this commodity in the selected month."
            }
            Self::DivisionByZero { .. } => {
                "The historical average price for this month is zero. Check the price dataset."
            }
            Self::UnknownCommodity { .. } => {
                "This commodity is not configured yet. Add it to the commodity tables and try again."
            }
            Self::InvalidInput(_) => "The request could not be processed. Check inputs and try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

pub(crate) fn ensure_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!(
            "month must be between 1 and 12, got {month}"
        )))
    }
}

pub(crate) fn ensure_price(label: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!(
            "{label} must be a non-negative number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dataset_has_actionable_message() {
        let error = EngineError::EmptyDataset("Okra".to_owned());
        assert_eq!(error.to_string(), "no price records for commodity `Okra`");
        assert!(error.user_message().contains("No historical price data"));
    }

    #[test]
    fn unknown_commodity_names_the_table() {
        let error = EngineError::UnknownCommodity {
            commodity: "Okra".to_owned(),
            table: "dry yield",
        };
        assert_eq!(error.to_string(), "commodity `Okra` is missing from the dry yield table");
    }

    #[test]
    fn month_bounds_are_inclusive() {
        assert!(ensure_month(1).is_ok());
        assert!(ensure_month(12).is_ok());
        assert!(ensure_month(0).is_err());
        assert!(ensure_month(13).is_err());
    }

    #[test]
    fn negative_and_nan_prices_are_rejected() {
        assert!(ensure_price("price", 0.0).is_ok());
        assert!(ensure_price("price", -1.0).is_err());
        assert!(ensure_price("price", f64::NAN).is_err());
    }
}
