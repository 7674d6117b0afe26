use chrono::Utc;
use skybook_catalog::{PriceBreakdown, PricingEngine};
use skybook_core::payment::PaymentRequest;
use skybook_core::validation::is_valid_seat_label;
use skybook_core::{FlightSelection, SessionBatch, SessionKey, SessionStore};
use skybook_shared::models::{BookingConfirmedEvent, PassengerDetailsSavedEvent, SeatSelectionSkippedEvent};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};
use uuid::Uuid;
use crate::assistance::{AssistanceOverlay, AssistanceType, CloseReason, ScrollEffect};
use crate::confirmation::ConfirmationService;
use crate::models::{BookingConfirmation, PassengerDetails, PassengerField, SeatSelection, Step};
use crate::orchestrator::PaymentOrchestrator;
use crate::passengers::{FieldErrors, PassengerForm};
use crate::payment_form::PaymentSelector;
use crate::session::{encode, BookingSessionRepo};
use crate::WorkflowError;

/// Result of entering a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEntry {
    Rendered(Step),
    /// A prerequisite was missing; the session was reset and the visitor sent to search.
    Redirected { requested: Step, missing: SessionKey },
}

impl StepEntry {
    pub fn step(&self) -> Step {
        match self {
            StepEntry::Rendered(step) => *step,
            StepEntry::Redirected { .. } => Step::Search,
        }
    }
}

/// Drives one visitor through search, passengers, seats, payment and confirmation.
///
/// The session store is the only state that survives a reload; the passenger form,
/// the assistance overlay and the payment selector are step-local.
pub struct BookingWorkflow<S: SessionStore> {
    id: Uuid,
    session: BookingSessionRepo<S>,
    pricing: PricingEngine,
    payments: PaymentOrchestrator,
    max_passengers: u32,
    step: Step,
    form: Option<PassengerForm>,
    overlay: AssistanceOverlay,
    payment: PaymentSelector,
}

impl<S: SessionStore> BookingWorkflow<S> {
    pub fn new(store: S, pricing: PricingEngine, payments: PaymentOrchestrator) -> Self {
        Self {
            id: Uuid::new_v4(),
            session: BookingSessionRepo::new(store),
            pricing,
            payments,
            max_passengers: 9,
            step: Step::Search,
            form: None,
            overlay: AssistanceOverlay::new(),
            payment: PaymentSelector::new(),
        }
    }

    pub fn with_max_passengers(mut self, max_passengers: u32) -> Self {
        self.max_passengers = max_passengers;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn session(&self) -> &BookingSessionRepo<S> {
        &self.session
    }

    pub fn passenger_form(&self) -> Option<&PassengerForm> {
        self.form.as_ref()
    }

    pub fn overlay(&self) -> &AssistanceOverlay {
        &self.overlay
    }

    pub fn payment(&self) -> &PaymentSelector {
        &self.payment
    }

    pub fn payment_mut(&mut self) -> &mut PaymentSelector {
        &mut self.payment
    }

    pub fn confirmation(&self) -> Option<BookingConfirmation> {
        self.session.confirmation()
    }

    /// The breakdown every summary and the final charge use.
    pub fn price_summary(&self) -> Option<PriceBreakdown> {
        let flight = self.session.flight()?;
        let count = flight.travellers();
        Some(self.pricing.compute_breakdown(&flight, count))
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    /// Search → FlightSelected. Slices belonging to any earlier flight go in the same write.
    pub fn select_flight(&mut self, flight: FlightSelection) -> Result<(), WorkflowError> {
        flight.validate(self.max_passengers)?;

        let batch = SessionBatch::new()
            .put(SessionKey::SelectedFlight, encode(&flight)?)
            .remove(SessionKey::PassengerDetails)
            .remove(SessionKey::SeatSelection)
            .remove(SessionKey::PaymentState)
            .remove(SessionKey::BookingConfirmation)
            .remove(SessionKey::BookingSaved);
        self.session.commit(batch);

        self.form = None;
        self.payment = PaymentSelector::new();
        info!(
            "Session {} selected {} {} ({} travellers)",
            self.id,
            flight.carrier,
            flight.flight_number,
            flight.travellers()
        );
        self.move_to(Step::FlightSelected);
        Ok(())
    }

    /// Runs the prerequisite check for `step` and renders it, or resets and redirects to search.
    pub fn enter(&mut self, step: Step) -> Result<StepEntry, WorkflowError> {
        if let Some(missing) = self.missing_prerequisite(step) {
            warn!("Session {} cannot enter {}: {} missing, restarting", self.id, step, missing);
            self.restart();
            return Ok(StepEntry::Redirected { requested: step, missing });
        }

        match step {
            Step::PassengerDetails => self.open_passenger_form()?,
            Step::Confirmation => {
                self.record_confirmation()?;
            }
            _ => {}
        }

        self.move_to(step);
        Ok(StepEntry::Rendered(step))
    }

    /// PassengerDetails → SeatSelection.
    pub fn continue_to_seats(&mut self) -> Result<PassengerDetailsSavedEvent, WorkflowError> {
        let (event, _) = self.submit_passengers(Step::SeatSelection, false)?;
        Ok(event)
    }

    /// PassengerDetails → Payment, dropping any seat selection from an earlier visit.
    pub fn skip_to_payment(&mut self) -> Result<SeatSelectionSkippedEvent, WorkflowError> {
        let (_, discarded_seats) = self.submit_passengers(Step::Payment, true)?;
        Ok(SeatSelectionSkippedEvent {
            session_id: self.id,
            discarded_seats,
            timestamp: Utc::now().timestamp(),
        })
    }

    /// SeatSelection → Payment.
    pub fn save_seats(&mut self, selection: SeatSelection) -> Result<(), WorkflowError> {
        self.expect_step(Step::SeatSelection, Step::Payment)?;
        let (_, details) = self.require_passengers(Step::SeatSelection)?;

        let mut errors = FieldErrors::new();
        let mut taken = BTreeSet::new();
        for (index, label) in &selection.seats {
            if *index >= details.passengers.len() {
                errors.insert(*index, "seat", "No passenger for this seat");
            } else if !is_valid_seat_label(label) {
                errors.insert(*index, "seat", "Please choose a valid seat");
            } else if !taken.insert(label.as_str()) {
                errors.insert(*index, "seat", format!("Seat {} is already assigned", label));
            }
        }
        if !errors.is_empty() {
            debug!("Session {} seat selection blocked by {} error(s)", self.id, errors.len());
            return Err(WorkflowError::ValidationFailed(errors));
        }

        self.session
            .commit(SessionBatch::new().put(SessionKey::SeatSelection, encode(&selection)?));
        self.move_to(Step::Payment);
        Ok(())
    }

    /// Payment → Confirmation. Settles the breakdown total, then records the booking once.
    pub async fn confirm_payment(&mut self) -> Result<BookingConfirmedEvent, WorkflowError> {
        self.expect_step(Step::Payment, Step::Confirmation)?;
        if !self.payment.can_proceed() {
            debug!("Session {} payment blocked: terms not accepted", self.id);
            return Err(WorkflowError::TermsNotAccepted);
        }
        let (flight, details) = self.require_passengers(Step::Payment)?;

        let breakdown = self.pricing.compute_breakdown(&flight, details.passengers.len());
        let request = PaymentRequest {
            session_id: self.id,
            amount: breakdown.total.amount,
            currency: breakdown.currency.clone(),
            method: self.payment.active(),
            description: format!("{} {}-{}", flight.flight_number, flight.origin, flight.destination),
        };
        let receipt = self.payments.settle(&request).await?;
        let settlement_reference = receipt.reference.clone();

        let mut state = self.payment.to_state(true);
        state.receipt = Some(receipt);
        // A fresh settlement must produce a fresh booking record.
        self.session.commit(
            SessionBatch::new()
                .put(SessionKey::PaymentState, encode(&state)?)
                .remove(SessionKey::BookingSaved)
                .remove(SessionKey::BookingConfirmation),
        );

        let confirmation = match self.enter(Step::Confirmation)? {
            StepEntry::Rendered(_) => self.session.confirmation().ok_or(WorkflowError::PrerequisiteMissing {
                step: Step::Confirmation,
                key: SessionKey::BookingConfirmation,
            })?,
            StepEntry::Redirected { requested, missing } => {
                return Err(WorkflowError::PrerequisiteMissing { step: requested, key: missing });
            }
        };

        Ok(BookingConfirmedEvent {
            session_id: self.id,
            booking_reference: confirmation.booking_reference,
            settlement_reference,
            total_amount: confirmation.total.amount,
            currency: confirmation.currency,
            timestamp: Utc::now().timestamp(),
        })
    }

    /// Backward navigation. Never discards entered data; the target step's guard still applies.
    pub fn back(&mut self) -> Result<StepEntry, WorkflowError> {
        let target = match self.step {
            Step::Search | Step::FlightSelected => Step::Search,
            Step::PassengerDetails => Step::FlightSelected,
            Step::SeatSelection => Step::PassengerDetails,
            Step::Payment if self.session.seat_selection().is_some() => Step::SeatSelection,
            Step::Payment => Step::PassengerDetails,
            Step::Confirmation => Step::Payment,
        };
        self.enter(target)
    }

    /// Drops the whole session and returns to search.
    pub fn restart(&mut self) {
        self.session.reset();
        self.form = None;
        self.payment = PaymentSelector::new();
        self.overlay.close(CloseReason::Navigation);
        info!("Session {} restarted", self.id);
        self.step = Step::Search;
    }

    // ---------------------------------------------------------------------
    // Passenger-details step
    // ---------------------------------------------------------------------

    pub fn update_passenger(&mut self, index: usize, field: PassengerField, value: &str) -> Result<(), WorkflowError> {
        self.active_form()?.update_field(index, field, value)
    }

    pub fn toggle_assistance(&mut self, index: usize, kind: AssistanceType) -> Result<bool, WorkflowError> {
        self.active_form()?.toggle_assistance(index, kind)
    }

    pub fn open_assistance(&mut self, index: usize) -> Result<ScrollEffect, WorkflowError> {
        if index >= self.active_form()?.len() {
            return Err(WorkflowError::UnknownPassenger(index));
        }
        Ok(self.overlay.open(index))
    }

    pub fn close_assistance(&mut self, reason: CloseReason) -> ScrollEffect {
        self.overlay.close(reason)
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    fn submit_passengers(
        &mut self,
        target: Step,
        clear_seats: bool,
    ) -> Result<(PassengerDetailsSavedEvent, usize), WorkflowError> {
        self.expect_step(Step::PassengerDetails, target)?;
        let flight = self.require_flight(Step::PassengerDetails)?;
        if self.form.is_none() {
            self.open_passenger_form()?;
        }
        let form = self.form.as_mut().ok_or(WorkflowError::PrerequisiteMissing {
            step: Step::PassengerDetails,
            key: SessionKey::SelectedFlight,
        })?;

        let errors = form.validate_all();
        if !errors.is_empty() {
            debug!("Session {} passenger details blocked by {} error(s)", self.id, errors.len());
            return Err(WorkflowError::ValidationFailed(errors.clone()));
        }

        let details: PassengerDetails = form.to_details();
        let discarded_seats = if clear_seats {
            self.session.seat_selection().map(|s| s.seats.len()).unwrap_or(0)
        } else {
            0
        };

        // Passengers and assistance land together; anything paid for an older party is void.
        let mut batch = SessionBatch::new()
            .put(SessionKey::PassengerDetails, encode(&details)?)
            .remove(SessionKey::PaymentState)
            .remove(SessionKey::BookingConfirmation)
            .remove(SessionKey::BookingSaved);
        if clear_seats {
            batch = batch.remove(SessionKey::SeatSelection);
        }
        self.session.commit(batch);

        let event = PassengerDetailsSavedEvent {
            session_id: self.id,
            flight_number: flight.flight_number.clone(),
            passenger_count: details.passengers.len(),
            assistance_requests: details.special_assistance.request_count(),
            timestamp: Utc::now().timestamp(),
        };
        info!(
            "Session {} saved {} passenger(s), {} assistance request(s)",
            self.id, event.passenger_count, event.assistance_requests
        );

        self.move_to(target);
        Ok((event, discarded_seats))
    }

    fn open_passenger_form(&mut self) -> Result<(), WorkflowError> {
        let flight = self.require_flight(Step::PassengerDetails)?;
        let travellers = flight.travellers();
        let reuse = self.form.as_ref().is_some_and(|f| f.len() == travellers);
        if !reuse {
            self.form = Some(PassengerForm::resume(self.session.passenger_details(), travellers));
        }
        Ok(())
    }

    fn record_confirmation(&mut self) -> Result<BookingConfirmation, WorkflowError> {
        if self.session.booking_saved() {
            if let Some(existing) = self.session.confirmation() {
                debug!("Session {} confirmation {} already saved", self.id, existing.booking_reference);
                return Ok(existing);
            }
        }

        let snapshot = self.session.snapshot().ok_or(WorkflowError::PrerequisiteMissing {
            step: Step::Confirmation,
            key: SessionKey::PassengerDetails,
        })?;
        let breakdown = self.pricing.compute_breakdown(&snapshot.flight, snapshot.passengers.len());
        let confirmation = ConfirmationService::issue(snapshot, &breakdown);

        self.session.commit(
            SessionBatch::new()
                .put(SessionKey::BookingConfirmation, encode(&confirmation)?)
                .put(SessionKey::BookingSaved, "true"),
        );
        info!("Session {} booking {} saved", self.id, confirmation.booking_reference);
        Ok(confirmation)
    }

    fn missing_prerequisite(&self, step: Step) -> Option<SessionKey> {
        if step == Step::Search {
            return None;
        }
        let Some(flight) = self.stored_flight() else {
            return Some(SessionKey::SelectedFlight);
        };
        if matches!(step, Step::FlightSelected | Step::PassengerDetails) {
            return None;
        }
        match self.session.passenger_details() {
            Some(details) if details.fits_party(flight.travellers()) => {}
            _ => return Some(SessionKey::PassengerDetails),
        }
        if step == Step::Confirmation && !self.session.payment_state().is_some_and(|p| p.completed) {
            return Some(SessionKey::PaymentState);
        }
        None
    }

    /// The stored flight, as long as it still passes the checks it was admitted with.
    fn stored_flight(&self) -> Option<FlightSelection> {
        let flight = self.session.flight()?;
        match flight.validate(self.max_passengers) {
            Ok(()) => Some(flight),
            Err(err) => {
                warn!("Session {} has an unusable stored flight: {}", self.id, err);
                None
            }
        }
    }

    fn require_flight(&mut self, step: Step) -> Result<FlightSelection, WorkflowError> {
        match self.stored_flight() {
            Some(flight) => Ok(flight),
            None => Err(self.abort(step, SessionKey::SelectedFlight)),
        }
    }

    fn require_passengers(&mut self, step: Step) -> Result<(FlightSelection, PassengerDetails), WorkflowError> {
        let flight = self.require_flight(step)?;
        match self.session.passenger_details() {
            Some(details) if details.fits_party(flight.travellers()) => Ok((flight, details)),
            _ => Err(self.abort(step, SessionKey::PassengerDetails)),
        }
    }

    fn abort(&mut self, step: Step, key: SessionKey) -> WorkflowError {
        warn!("Session {} lost {} during {}, restarting", self.id, key, step);
        self.restart();
        WorkflowError::PrerequisiteMissing { step, key }
    }

    fn active_form(&mut self) -> Result<&mut PassengerForm, WorkflowError> {
        if self.step != Step::PassengerDetails {
            return Err(WorkflowError::InvalidTransition { from: self.step, to: Step::PassengerDetails });
        }
        if self.form.is_none() {
            self.open_passenger_form()?;
        }
        self.form.as_mut().ok_or(WorkflowError::PrerequisiteMissing {
            step: Step::PassengerDetails,
            key: SessionKey::SelectedFlight,
        })
    }

    fn expect_step(&self, expected: Step, to: Step) -> Result<(), WorkflowError> {
        if self.step != expected {
            return Err(WorkflowError::InvalidTransition { from: self.step, to });
        }
        Ok(())
    }

    fn move_to(&mut self, to: Step) {
        if self.step != to {
            if self.overlay.is_open() {
                self.overlay.close(CloseReason::Navigation);
            }
            info!("Session {} moved {} -> {}", self.id, self.step, to);
        }
        self.step = to;
    }
}
