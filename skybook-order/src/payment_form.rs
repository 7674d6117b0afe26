use serde::{Deserialize, Serialize};
use skybook_core::payment::PaymentMethod;
use skybook_core::validation::{format_expiry, sanitize_alphabetic, sanitize_card_number, sanitize_cvv};
use skybook_shared::pii::{mask_tail, Masked};
use tracing::debug;
use crate::models::PaymentState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CardField {
    Number,
    HolderName,
    Expiry,
    Cvv,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDetails {
    pub number: Masked<String>,
    pub holder_name: String,
    pub expiry: String,
    pub cvv: Masked<String>,
}

/// Inputs of the placeholder methods. They hold state but never gate anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeDetails {
    pub upi_id: String,
    pub bank: String,
    pub wallet: String,
}

/// Payment step state: one active method, its inputs, and the terms checkbox.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentSelector {
    active: PaymentMethod,
    card: CardDetails,
    alternatives: AlternativeDetails,
    terms_accepted: bool,
}

impl PaymentSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> PaymentMethod {
        self.active
    }

    pub fn is_active(&self, method: PaymentMethod) -> bool {
        self.active == method
    }

    /// Activating a method deactivates every other one.
    pub fn select(&mut self, method: PaymentMethod) {
        if self.active != method {
            debug!("Payment method switched from {:?} to {:?}", self.active, method);
            self.active = method;
        }
    }

    pub fn card(&self) -> &CardDetails {
        &self.card
    }

    pub fn alternatives(&self) -> &AlternativeDetails {
        &self.alternatives
    }

    /// Applies the card input masks and returns the stored value.
    pub fn update_card(&mut self, field: CardField, value: &str) -> String {
        match field {
            CardField::Number => {
                self.card.number = Masked(sanitize_card_number(value));
                self.card.number.reveal().clone()
            }
            CardField::HolderName => {
                self.card.holder_name = sanitize_alphabetic(value);
                self.card.holder_name.clone()
            }
            CardField::Expiry => {
                self.card.expiry = format_expiry(value);
                self.card.expiry.clone()
            }
            CardField::Cvv => {
                self.card.cvv = Masked(sanitize_cvv(value));
                self.card.cvv.reveal().clone()
            }
        }
    }

    pub fn set_upi_id(&mut self, value: &str) {
        self.alternatives.upi_id = value.trim().to_string();
    }

    pub fn set_bank(&mut self, value: &str) {
        self.alternatives.bank = value.trim().to_string();
    }

    pub fn set_wallet(&mut self, value: &str) {
        self.alternatives.wallet = value.trim().to_string();
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn set_terms_accepted(&mut self, accepted: bool) {
        self.terms_accepted = accepted;
    }

    /// Proceed is gated on the terms checkbox alone, whatever the method.
    pub fn can_proceed(&self) -> bool {
        self.terms_accepted
    }

    /// Last four digits of the card, for the confirmation view.
    pub fn card_summary(&self) -> Option<String> {
        let number = self.card.number.reveal();
        (self.active == PaymentMethod::Card && number.len() >= 4).then(|| mask_tail(number, 4))
    }

    /// What gets persisted; card number and CVV never leave this struct.
    pub fn to_state(&self, completed: bool) -> PaymentState {
        PaymentState {
            method: self.active,
            terms_accepted: self.terms_accepted,
            completed,
            card_summary: self.card_summary(),
            receipt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_are_mutually_exclusive() {
        let mut selector = PaymentSelector::new();
        assert!(selector.is_active(PaymentMethod::Card));

        selector.select(PaymentMethod::Upi);
        let active: Vec<_> = PaymentMethod::ALL.iter().filter(|m| selector.is_active(**m)).collect();
        assert_eq!(active, vec![&PaymentMethod::Upi]);
    }

    #[test]
    fn test_card_masks() {
        let mut selector = PaymentSelector::new();
        assert_eq!(selector.update_card(CardField::Number, "12ab-34!!56"), "123456");
        assert_eq!(selector.update_card(CardField::Number, "4111 1111 1111 1111 22"), "4111111111111111");
        assert_eq!(selector.update_card(CardField::HolderName, "A. Rao 3rd"), "A Rao rd");
        assert_eq!(selector.update_card(CardField::Expiry, "0927"), "09/27");
        assert_eq!(selector.update_card(CardField::Cvv, "12x34"), "123");
    }

    #[test]
    fn test_terms_gate_independent_of_method() {
        let mut selector = PaymentSelector::new();
        for method in PaymentMethod::ALL {
            selector.select(method);
            assert!(!selector.can_proceed());
        }
        selector.set_terms_accepted(true);
        for method in PaymentMethod::ALL {
            selector.select(method);
            assert!(selector.can_proceed());
        }
    }

    #[test]
    fn test_placeholder_inputs_do_not_gate() {
        let mut selector = PaymentSelector::new();
        selector.select(PaymentMethod::NetBanking);
        selector.set_bank("");
        selector.set_terms_accepted(true);
        assert!(selector.can_proceed());
    }

    #[test]
    fn test_state_never_carries_card_number() {
        let mut selector = PaymentSelector::new();
        selector.update_card(CardField::Number, "4111111111111234");
        selector.update_card(CardField::Cvv, "999");
        selector.set_terms_accepted(true);

        let state = selector.to_state(true);
        let json = serde_json::to_string(&state).unwrap();
        assert!(!json.contains("4111111111111234"));
        assert!(!json.contains("999"));
        assert_eq!(state.card_summary.as_deref(), Some("•••• 1234"));
        assert!(format!("{:?}", selector.card()).contains("********"));
    }
}
