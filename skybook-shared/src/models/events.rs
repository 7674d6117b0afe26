use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct PassengerDetailsSavedEvent {
    pub session_id: Uuid,
    pub flight_number: String,
    pub passenger_count: usize,
    pub assistance_requests: usize,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SeatSelectionSkippedEvent {
    pub session_id: Uuid,
    pub discarded_seats: usize, // seats dropped from an earlier visit to the seat map
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct BookingConfirmedEvent {
    pub session_id: Uuid,
    pub booking_reference: String,
    pub settlement_reference: String,
    pub total_amount: f64,
    pub currency: String,
    pub timestamp: i64,
}
