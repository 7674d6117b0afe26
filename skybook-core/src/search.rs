use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use crate::validation::is_airport_code;
use crate::{CoreError, CoreResult};

/// What the visitor searched for; `travellers` fixes the passenger count for the booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate, // Just date, the flight carries the scheduled times
    pub travellers: u32,
}

/// One priced line of a breakdown as carried on the flight record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceComponent {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingBlock {
    pub base: PriceComponent,
    pub taxes: PriceComponent,
    pub total: PriceComponent,
}

/// Snapshot of the flight the visitor picked. Read-only once stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSelection {
    pub carrier: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub departure_time: String,
    #[serde(default)]
    pub arrival_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub search_criteria: SearchCriteria,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingBlock>,
    /// Legacy records only carry this, as a number or a numeric string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_price: Option<serde_json::Value>,
}

impl FlightSelection {
    pub fn travellers(&self) -> usize {
        self.search_criteria.travellers as usize
    }

    /// Legacy fare as a float; anything unparsable counts as zero.
    pub fn legacy_fare(&self) -> f64 {
        let parsed = match &self.final_price {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// Currency declared by the record itself, if any.
    pub fn declared_currency(&self) -> Option<&str> {
        self.currency
            .as_deref()
            .or_else(|| self.pricing.as_ref().and_then(|p| p.total.currency.as_deref()))
            .filter(|c| !c.trim().is_empty())
    }

    /// Shape checks run when the search collaborator hands a selection over.
    pub fn validate(&self, max_passengers: u32) -> CoreResult<()> {
        let travellers = self.search_criteria.travellers;
        if travellers == 0 || travellers > max_passengers {
            return Err(CoreError::ValidationError(format!(
                "traveller count must be between 1 and {}, got {}",
                max_passengers, travellers
            )));
        }
        for code in [&self.origin, &self.destination] {
            if !is_airport_code(code) {
                return Err(CoreError::ValidationError(format!("invalid airport code: {}", code)));
            }
        }
        if self.flight_number.trim().is_empty() {
            return Err(CoreError::ValidationError("flight number is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_json(price: &str) -> String {
        format!(
            r#"{{
                "carrier": "IndiGo",
                "flightNumber": "6E-201",
                "origin": "DEL",
                "destination": "BOM",
                "departureTime": "06:10",
                "arrivalTime": "08:25",
                "searchCriteria": {{"origin": "DEL", "destination": "BOM", "date": "2024-12-25", "travellers": 2}},
                "finalPrice": {}
            }}"#,
            price
        )
    }

    #[test]
    fn test_legacy_selection_deserialization() {
        let flight: FlightSelection = serde_json::from_str(&legacy_json("1000")).expect("Failed to deserialize");
        assert_eq!(flight.flight_number, "6E-201");
        assert_eq!(flight.travellers(), 2);
        assert_eq!(flight.search_criteria.date, NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        assert!(flight.pricing.is_none());
        assert_eq!(flight.legacy_fare(), 1000.0);
    }

    #[test]
    fn test_legacy_fare_from_string_and_garbage() {
        let flight: FlightSelection = serde_json::from_str(&legacy_json("\"4520.50\"")).unwrap();
        assert_eq!(flight.legacy_fare(), 4520.5);

        let flight: FlightSelection = serde_json::from_str(&legacy_json("\"call us\"")).unwrap();
        assert_eq!(flight.legacy_fare(), 0.0);

        let flight: FlightSelection = serde_json::from_str(&legacy_json("null")).unwrap();
        assert_eq!(flight.legacy_fare(), 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_counts_and_codes() {
        let mut flight: FlightSelection = serde_json::from_str(&legacy_json("1000")).unwrap();
        assert!(flight.validate(9).is_ok());

        flight.search_criteria.travellers = 0;
        assert!(flight.validate(9).is_err());

        flight.search_criteria.travellers = 10;
        assert!(flight.validate(9).is_err());

        flight.search_criteria.travellers = 1;
        flight.origin = "delhi".to_string();
        assert!(flight.validate(9).is_err());
    }
}
