use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use chrono::{DateTime, Utc};
use skybook_core::payment::{PaymentMethod, SettlementReceipt};
use skybook_core::FlightSelection;
use skybook_catalog::Money;
use crate::assistance::SpecialAssistanceSelections;

/// Named steps of the booking wizard, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Search,
    FlightSelected,
    PassengerDetails,
    SeatSelection,
    Payment,
    Confirmation,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Search => "search",
            Step::FlightSelected => "flight-selected",
            Step::PassengerDetails => "passenger-details",
            Step::SeatSelection => "seat-selection",
            Step::Payment => "payment",
            Step::Confirmation => "confirmation",
        }
    }

    pub fn parse(raw: &str) -> Option<Step> {
        [
            Step::Search,
            Step::FlightSelected,
            Step::PassengerDetails,
            Step::SeatSelection,
            Step::Payment,
            Step::Confirmation,
        ]
        .into_iter()
        .find(|s| s.as_str() == raw)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Gender> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Editable passenger fields, named as in the session payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PassengerField {
    FirstName,
    MiddleName,
    LastName,
    Gender,
    Age,
    Email,
    Phone,
}

impl PassengerField {
    pub fn key(&self) -> &'static str {
        match self {
            PassengerField::FirstName => "firstName",
            PassengerField::MiddleName => "middleName",
            PassengerField::LastName => "lastName",
            PassengerField::Gender => "gender",
            PassengerField::Age => "age",
            PassengerField::Email => "email",
            PassengerField::Phone => "phone",
        }
    }

    pub fn is_contact(&self) -> bool {
        matches!(self, PassengerField::Email | PassengerField::Phone)
    }
}

impl fmt::Display for PassengerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One traveller. Only the primary passenger (index 0) carries contact fields at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerRecord {
    pub id: u32,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl PassengerRecord {
    pub fn blank(index: usize) -> Self {
        let primary = index == 0;
        Self {
            id: index as u32 + 1,
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            gender: None,
            age: String::new(),
            email: primary.then(String::new),
            phone: primary.then(String::new),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.id == 1
    }

    pub fn full_name(&self) -> String {
        [&self.first_name, &self.middle_name, &self.last_name]
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The `passengerDetails` slot: written in one piece when the step completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetails {
    pub passengers: Vec<PassengerRecord>,
    #[serde(default)]
    pub special_assistance: SpecialAssistanceSelections,
}

impl PassengerDetails {
    /// Whether this saved set still describes a party of `count`, with contact keys on index 0 only.
    pub fn fits_party(&self, count: usize) -> bool {
        self.passengers.len() == count
            && self.passengers.iter().enumerate().all(|(index, p)| {
                let primary = index == 0;
                p.email.is_some() == primary && p.phone.is_some() == primary
            })
    }
}

/// The `seatSelection` slot: passenger index to seat label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeatSelection {
    pub seats: BTreeMap<usize, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentState {
    pub method: PaymentMethod,
    pub terms_accepted: bool,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SettlementReceipt>,
}

/// Everything persisted for one visitor's booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingSession {
    pub flight: FlightSelection,
    pub passengers: Vec<PassengerRecord>,
    pub special_assistance: SpecialAssistanceSelections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_selection: Option<SeatSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_state: Option<PaymentState>,
}

/// Record handed to the confirmation view once settlement succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking_reference: String,
    pub session: BookingSession,
    pub total: Money,
    pub currency: String,
    pub settlement_reference: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_records_carry_contact_only_on_primary() {
        let primary = serde_json::to_value(PassengerRecord::blank(0)).unwrap();
        let other = serde_json::to_value(PassengerRecord::blank(1)).unwrap();

        assert_eq!(primary["id"], 1);
        assert_eq!(primary["email"], "");
        assert_eq!(primary["phone"], "");
        assert_eq!(other["id"], 2);
        assert!(other.get("email").is_none());
        assert!(other.get("phone").is_none());
    }

    #[test]
    fn test_step_names_round_trip() {
        assert_eq!(Step::parse("passenger-details"), Some(Step::PassengerDetails));
        assert_eq!(serde_json::to_string(&Step::SeatSelection).unwrap(), "\"seat-selection\"");
        assert_eq!(Step::parse("checkout"), None);
    }

    #[test]
    fn test_full_name_skips_empty_middle() {
        let mut p = PassengerRecord::blank(0);
        p.first_name = "Asha".into();
        p.last_name = "Rao".into();
        assert_eq!(p.full_name(), "Asha Rao");
        p.middle_name = "K".into();
        assert_eq!(p.full_name(), "Asha K Rao");
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse(" other "), Some(Gender::Other));
        assert_eq!(Gender::parse(""), None);
    }
}
