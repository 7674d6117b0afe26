//! Special-assistance requests. Purely informational: nothing here feeds validation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum AssistanceType {
    ServiceAnimal,
    VisuallyImpaired,
    HearingImpaired,
    Mobility,
    MedicalEquipment,
    Elderly,
}

impl AssistanceType {
    pub const ALL: [AssistanceType; 6] = [
        AssistanceType::ServiceAnimal,
        AssistanceType::VisuallyImpaired,
        AssistanceType::HearingImpaired,
        AssistanceType::Mobility,
        AssistanceType::MedicalEquipment,
        AssistanceType::Elderly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AssistanceType::ServiceAnimal => "Travelling with a service animal",
            AssistanceType::VisuallyImpaired => "Visually impaired",
            AssistanceType::HearingImpaired => "Hearing impaired",
            AssistanceType::Mobility => "Wheelchair or mobility assistance",
            AssistanceType::MedicalEquipment => "Carrying medical equipment",
            AssistanceType::Elderly => "Senior citizen assistance",
        }
    }
}

/// Passenger index to the assistance types requested for that passenger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct SpecialAssistanceSelections {
    selections: BTreeMap<usize, BTreeSet<AssistanceType>>,
}

impl SpecialAssistanceSelections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one `(passenger, type)` cell and returns its new value.
    pub fn toggle(&mut self, passenger_index: usize, kind: AssistanceType) -> bool {
        let set = self.selections.entry(passenger_index).or_default();
        let selected = if set.remove(&kind) {
            false
        } else {
            set.insert(kind);
            true
        };
        if set.is_empty() {
            self.selections.remove(&passenger_index);
        }
        selected
    }

    pub fn is_selected(&self, passenger_index: usize, kind: AssistanceType) -> bool {
        self.selections
            .get(&passenger_index)
            .is_some_and(|set| set.contains(&kind))
    }

    pub fn for_passenger(&self, passenger_index: usize) -> Vec<AssistanceType> {
        self.selections
            .get(&passenger_index)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of `(passenger, type)` requests across the booking.
    pub fn request_count(&self) -> usize {
        self.selections.values().map(BTreeSet::len).sum()
    }

    /// Drops entries for passengers that no longer exist.
    pub fn retain_passengers(&mut self, passenger_count: usize) {
        self.selections.retain(|index, _| *index < passenger_count);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CloseReason {
    Button,
    Backdrop,
    Escape,
    /// The visitor left the step with the overlay still open.
    Navigation,
}

/// What the page should do with background scrolling after an overlay change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ScrollEffect {
    Suppress,
    Restore,
    Unchanged,
}

/// Open/closed state of the assistance overlay and the background scroll lock it owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistanceOverlay {
    open_for: Option<usize>,
    scroll_suppressed: bool,
}

impl AssistanceOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_for(&self) -> Option<usize> {
        self.open_for
    }

    pub fn is_open(&self) -> bool {
        self.open_for.is_some()
    }

    pub fn scroll_suppressed(&self) -> bool {
        self.scroll_suppressed
    }

    /// Opens (or retargets) the overlay. Scrolling is suppressed at most once.
    pub fn open(&mut self, passenger_index: usize) -> ScrollEffect {
        self.open_for = Some(passenger_index);
        if self.scroll_suppressed {
            return ScrollEffect::Unchanged;
        }
        self.scroll_suppressed = true;
        ScrollEffect::Suppress
    }

    /// Closes the overlay. Selections live elsewhere and are untouched.
    pub fn close(&mut self, reason: CloseReason) -> ScrollEffect {
        if let Some(index) = self.open_for.take() {
            debug!("Assistance overlay for passenger {} closed via {:?}", index, reason);
        }
        if !self.scroll_suppressed {
            return ScrollEffect::Unchanged;
        }
        self.scroll_suppressed = false;
        ScrollEffect::Restore
    }
}
