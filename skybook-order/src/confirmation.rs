use chrono::Utc;
use skybook_catalog::PriceBreakdown;
use uuid::Uuid;
use crate::models::{BookingConfirmation, BookingSession};

/// Issues confirmation records for settled sessions.
pub struct ConfirmationService;

impl ConfirmationService {
    /// Builds the record for a settled session.
    pub fn issue(session: BookingSession, breakdown: &PriceBreakdown) -> BookingConfirmation {
        let settlement_reference = session
            .payment_state
            .as_ref()
            .and_then(|p| p.receipt.as_ref())
            .map(|r| r.reference.clone());

        BookingConfirmation {
            booking_reference: Self::generate_reference(),
            session,
            total: breakdown.total.clone(),
            currency: breakdown.currency.clone(),
            settlement_reference,
            confirmed_at: Utc::now(),
        }
    }

    /// Six uppercase characters, PNR style.
    pub fn generate_reference() -> String {
        Uuid::new_v4().simple().to_string()[..6].to_uppercase()
    }
}
