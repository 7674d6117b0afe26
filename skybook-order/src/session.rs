use serde::de::DeserializeOwned;
use serde::Serialize;
use skybook_core::{CoreResult, FlightSelection, SessionBatch, SessionKey, SessionStore};
use tracing::warn;
use crate::models::{BookingConfirmation, BookingSession, PassengerDetails, PaymentState, SeatSelection};

/// Typed view over a visitor's session slots.
pub struct BookingSessionRepo<S: SessionStore> {
    store: S,
}

pub fn encode<T: Serialize>(value: &T) -> CoreResult<String> {
    Ok(serde_json::to_string(value)?)
}

impl<S: SessionStore> BookingSessionRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Absent and unparsable slots both read as `None`.
    pub fn read<T: DeserializeOwned>(&self, key: SessionKey) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Session slot {} is unreadable: {}", key, e);
                None
            }
        }
    }

    pub fn flight(&self) -> Option<FlightSelection> {
        self.read(SessionKey::SelectedFlight)
    }

    pub fn passenger_details(&self) -> Option<PassengerDetails> {
        self.read(SessionKey::PassengerDetails)
    }

    pub fn seat_selection(&self) -> Option<SeatSelection> {
        self.read(SessionKey::SeatSelection)
    }

    pub fn payment_state(&self) -> Option<PaymentState> {
        self.read(SessionKey::PaymentState)
    }

    pub fn confirmation(&self) -> Option<BookingConfirmation> {
        self.read(SessionKey::BookingConfirmation)
    }

    pub fn booking_saved(&self) -> bool {
        self.store.contains(SessionKey::BookingSaved)
    }

    /// The aggregate, once a flight and passenger details exist.
    pub fn snapshot(&self) -> Option<BookingSession> {
        let flight = self.flight()?;
        let details = self.passenger_details()?;
        Some(BookingSession {
            flight,
            passengers: details.passengers,
            special_assistance: details.special_assistance,
            seat_selection: self.seat_selection(),
            payment_state: self.payment_state(),
        })
    }

    pub fn commit(&mut self, batch: SessionBatch) {
        if !batch.is_empty() {
            self.store.apply(batch);
        }
    }

    pub fn reset(&mut self) {
        self.store.clear();
    }
}
