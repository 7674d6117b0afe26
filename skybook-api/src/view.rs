use serde::Serialize;
use skybook_catalog::PriceBreakdown;
use skybook_core::payment::PaymentMethod;
use skybook_core::FlightSelection;
use skybook_order::assistance::SpecialAssistanceSelections;
use skybook_order::{BookingConfirmation, FieldErrors, PassengerRecord, SeatSelection, Step};
use uuid::Uuid;
use crate::state::VisitorWorkflow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub method: PaymentMethod,
    /// Only card payments collect live input; the rest are placeholders.
    pub live_inputs: bool,
    pub terms_accepted: bool,
    pub can_proceed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_summary: Option<String>,
}

/// What a client needs to draw the current step.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub session_id: Uuid,
    pub step: Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight: Option<FlightSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passengers: Option<Vec<PassengerRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_assistance: Option<SpecialAssistanceSelections>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistance_open_for: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_selection: Option<SeatSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PriceBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<BookingConfirmation>,
}

impl StepView {
    pub fn of(workflow: &VisitorWorkflow) -> Self {
        let step = workflow.step();
        let form = workflow.passenger_form().filter(|_| step == Step::PassengerDetails);

        let mut view = StepView {
            session_id: workflow.id(),
            step,
            flight: None,
            passengers: form.map(|f| f.passengers().to_vec()),
            errors: form.map(|f| f.errors().clone()),
            special_assistance: form.map(|f| f.special_assistance().clone()),
            assistance_open_for: workflow.overlay().open_for(),
            seat_selection: None,
            pricing: None,
            payment: None,
            confirmation: None,
        };

        match step {
            Step::Search => {}
            Step::FlightSelected => {
                view.flight = workflow.session().flight();
            }
            Step::PassengerDetails => {
                view.flight = workflow.session().flight();
                view.pricing = workflow.price_summary();
            }
            Step::SeatSelection => {
                view.flight = workflow.session().flight();
                view.seat_selection = workflow.session().seat_selection();
            }
            Step::Payment => {
                let selector = workflow.payment();
                view.pricing = workflow.price_summary();
                view.payment = Some(PaymentView {
                    method: selector.active(),
                    live_inputs: selector.active().is_live(),
                    terms_accepted: selector.terms_accepted(),
                    can_proceed: selector.can_proceed(),
                    card_summary: selector.card_summary(),
                });
            }
            Step::Confirmation => {
                view.confirmation = workflow.confirmation();
            }
        }
        view
    }
}
