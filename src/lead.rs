use crate::error::{EngineError, Result};
use crate::models::{LeadRequest, Urgency};
use crate::pipeline::Analysis;

impl LeadRequest {
    /// Builds the buyer-matching payload for an analysed harvest. When no
    /// urgency is given it follows the risk tier.
    pub fn from_analysis(
        analysis: &Analysis,
        quantity: f64,
        location: &str,
        urgency: Option<Urgency>,
    ) -> Result<Self> {
        if !(quantity.is_finite() && quantity >= 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "quantity must be a non-negative number, got {quantity}"
            )));
        }
        let location = location.trim();
        if location.is_empty() {
            return Err(EngineError::InvalidInput("location must not be blank".to_owned()));
        }

        let risk_tier = analysis.assessment.risk_tier;
        Ok(Self {
            commodity: analysis.commodity.clone(),
            quantity,
            location: location.to_owned(),
            infrastructure: analysis.recommendation.infrastructure,
            risk_tier,
            urgency: urgency.unwrap_or_else(|| Urgency::suggested_for(risk_tier)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InfrastructureChoice, PriceRecord, RiskTier};
    use crate::pipeline::{analyze, AnalysisRequest, EngineConfig};

    fn high_risk_tomato() -> Analysis {
        let records = vec![
            PriceRecord::new("Tomato", 2023, 1, 1000.0),
            PriceRecord::new("Tomato", 2024, 1, 600.0),
        ];
        let request = AnalysisRequest::new("Tomato", 1).with_current_price(400.0);
        analyze(&records, &request, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn lead_carries_decision_fields() {
        let lead =
            LeadRequest::from_analysis(&high_risk_tomato(), 250.0, " Nashik ", None).unwrap();
        assert_eq!(lead.commodity, "Tomato");
        assert_eq!(lead.location, "Nashik");
        assert_eq!(lead.infrastructure, InfrastructureChoice::SolarDryer);
        assert_eq!(lead.risk_tier, RiskTier::HighRisk);
        assert_eq!(lead.urgency, Urgency::High);
    }

    #[test]
    fn explicit_urgency_wins() {
        let lead = LeadRequest::from_analysis(&high_risk_tomato(), 10.0, "Pune", Some(Urgency::Low))
            .unwrap();
        assert_eq!(lead.urgency, Urgency::Low);
    }

    #[test]
    fn serializes_as_flat_json() {
        let lead = LeadRequest::from_analysis(&high_risk_tomato(), 250.0, "Nashik", None).unwrap();
        let value = serde_json::to_value(&lead).unwrap();
        assert_eq!(value["infrastructure"], "solar_dryer");
        assert_eq!(value["risk_tier"], "high_risk");
        assert_eq!(value["urgency"], "high");
        assert_eq!(value["quantity"], 250.0);
    }

    #[test]
    fn rejects_negative_quantity_and_blank_location() {
        let analysis = high_risk_tomato();
        assert!(matches!(
            LeadRequest::from_analysis(&analysis, -5.0, "Pune", None),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            LeadRequest::from_analysis(&analysis, 5.0, "  ", None),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
