use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use skybook_core::validation::{
    is_valid_age, is_valid_email, is_valid_phone, sanitize_alphabetic, sanitize_digits, sanitize_phone,
};
use crate::assistance::{AssistanceType, SpecialAssistanceSelections};
use crate::models::{Gender, PassengerDetails, PassengerField, PassengerRecord};
use crate::WorkflowError;

/// Inline messages keyed `"{passengerIndex}-{field}"`, e.g. `"0-email"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(index: usize, field: &str) -> String {
        format!("{}-{}", index, field)
    }

    pub fn insert(&mut self, index: usize, field: &str, message: impl Into<String>) {
        self.0.insert(Self::key(index, field), message.into());
    }

    pub fn get(&self, index: usize, field: &str) -> Option<&str> {
        self.0.get(&Self::key(index, field)).map(String::as_str)
    }

    pub fn clear_field(&mut self, index: usize, field: &str) {
        self.0.remove(&Self::key(index, field));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

/// Step-local state of the passenger-details form.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerForm {
    passengers: Vec<PassengerRecord>,
    special_assistance: SpecialAssistanceSelections,
    errors: FieldErrors,
}

impl PassengerForm {
    /// Fresh form with `count` blank records; contact keys exist only on index 0.
    pub fn new(count: usize) -> Self {
        Self {
            passengers: (0..count).map(PassengerRecord::blank).collect(),
            special_assistance: SpecialAssistanceSelections::new(),
            errors: FieldErrors::new(),
        }
    }

    /// Re-opens previously saved details, or starts over when they no longer fit the party.
    pub fn resume(saved: Option<PassengerDetails>, count: usize) -> Self {
        match saved {
            Some(details) if details.fits_party(count) => {
                let mut special_assistance = details.special_assistance;
                special_assistance.retain_passengers(count);
                Self {
                    passengers: details.passengers,
                    special_assistance,
                    errors: FieldErrors::new(),
                }
            }
            _ => Self::new(count),
        }
    }

    pub fn passengers(&self) -> &[PassengerRecord] {
        &self.passengers
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn special_assistance(&self) -> &SpecialAssistanceSelections {
        &self.special_assistance
    }

    /// Masks the value through the field's sanitizer, stores it and clears that field's error.
    pub fn update_field(&mut self, index: usize, field: PassengerField, value: &str) -> Result<(), WorkflowError> {
        let passenger = self
            .passengers
            .get_mut(index)
            .ok_or(WorkflowError::UnknownPassenger(index))?;

        match field {
            PassengerField::FirstName => passenger.first_name = sanitize_alphabetic(value),
            PassengerField::MiddleName => passenger.middle_name = sanitize_alphabetic(value),
            PassengerField::LastName => passenger.last_name = sanitize_alphabetic(value),
            PassengerField::Gender => passenger.gender = Gender::parse(value),
            PassengerField::Age => passenger.age = sanitize_digits(value).chars().take(3).collect(),
            PassengerField::Email => match passenger.email.as_mut() {
                Some(email) => *email = value.trim().to_string(),
                None => return Err(WorkflowError::UnknownField { index, field }),
            },
            PassengerField::Phone => match passenger.phone.as_mut() {
                Some(phone) => *phone = sanitize_phone(value),
                None => return Err(WorkflowError::UnknownField { index, field }),
            },
        }

        self.errors.clear_field(index, field.key());
        Ok(())
    }

    pub fn toggle_assistance(&mut self, index: usize, kind: AssistanceType) -> Result<bool, WorkflowError> {
        if index >= self.passengers.len() {
            return Err(WorkflowError::UnknownPassenger(index));
        }
        Ok(self.special_assistance.toggle(index, kind))
    }

    /// Recomputes every error from scratch and keeps the result for display.
    pub fn validate_all(&mut self) -> &FieldErrors {
        self.errors = validate_passengers(&self.passengers);
        &self.errors
    }

    pub fn to_details(&self) -> PassengerDetails {
        PassengerDetails {
            passengers: self.passengers.clone(),
            special_assistance: self.special_assistance.clone(),
        }
    }
}

/// Rules for the whole party. Contact fields are required exactly where the record carries them.
pub fn validate_passengers(passengers: &[PassengerRecord]) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for (index, p) in passengers.iter().enumerate() {
        if p.first_name.trim().is_empty() {
            errors.insert(index, "firstName", "First name is required");
        }
        if p.last_name.trim().is_empty() {
            errors.insert(index, "lastName", "Last name is required");
        }
        if p.gender.is_none() {
            errors.insert(index, "gender", "Please select a gender");
        }
        if p.age.trim().is_empty() {
            errors.insert(index, "age", "Age is required");
        } else if !is_valid_age(&p.age) {
            errors.insert(index, "age", "Age must be between 0 and 100");
        }

        if let Some(email) = &p.email {
            if email.trim().is_empty() {
                errors.insert(index, "email", "Email is required");
            } else if !is_valid_email(email) {
                errors.insert(index, "email", "Please enter a valid email address");
            }
        }
        if let Some(phone) = &p.phone {
            if phone.is_empty() {
                errors.insert(index, "phone", "Phone number is required");
            } else if !is_valid_phone(phone) {
                errors.insert(index, "phone", "Phone number must be exactly 10 digits");
            }
        }
    }

    errors
}
