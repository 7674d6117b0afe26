use std::fmt;

/// Well-known slots of the visitor's booking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionKey {
    SelectedFlight,
    PassengerDetails,
    SeatSelection,
    PaymentState,
    BookingConfirmation,
    /// Short-lived marker set once the confirmation record is written.
    BookingSaved,
}

impl SessionKey {
    pub const ALL: [SessionKey; 6] = [
        SessionKey::SelectedFlight,
        SessionKey::PassengerDetails,
        SessionKey::SeatSelection,
        SessionKey::PaymentState,
        SessionKey::BookingConfirmation,
        SessionKey::BookingSaved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::SelectedFlight => "selectedFlight",
            SessionKey::PassengerDetails => "passengerDetails",
            SessionKey::SeatSelection => "seatSelection",
            SessionKey::PaymentState => "paymentState",
            SessionKey::BookingConfirmation => "bookingConfirmation",
            SessionKey::BookingSaved => "bookingSaved",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionWrite {
    Put(SessionKey, String),
    Remove(SessionKey),
}

/// A group of writes that a store must apply all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBatch {
    writes: Vec<SessionWrite>,
}

impl SessionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, key: SessionKey, value: impl Into<String>) -> Self {
        self.writes.push(SessionWrite::Put(key, value.into()));
        self
    }

    pub fn remove(mut self, key: SessionKey) -> Self {
        self.writes.push(SessionWrite::Remove(key));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_writes(self) -> Vec<SessionWrite> {
        self.writes
    }
}

/// Key-value storage for one visitor's booking session.
///
/// Values are raw serialized payloads; a slot whose payload no longer parses is
/// treated by callers the same as an absent one.
pub trait SessionStore: Send {
    fn get(&self, key: SessionKey) -> Option<String>;

    fn set(&mut self, key: SessionKey, value: String);

    fn remove(&mut self, key: SessionKey);

    /// Drop every slot.
    fn clear(&mut self);

    /// Apply every write of the batch, or none of them.
    fn apply(&mut self, batch: SessionBatch);

    fn contains(&self, key: SessionKey) -> bool {
        self.get(key).is_some()
    }
}
