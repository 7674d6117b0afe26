pub mod events;

pub use events::{BookingConfirmedEvent, PassengerDetailsSavedEvent, SeatSelectionSkippedEvent};
