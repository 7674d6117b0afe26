use serde::{Deserialize, Serialize};
use skybook_core::FlightSelection;
use tracing::{debug, warn};
use crate::currency::format_amount;

/// An amount together with its display rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Money {
    pub amount: f64,
    pub formatted: String,
}

impl Money {
    pub fn new(amount: f64, currency: &str) -> Self {
        Self {
            amount,
            formatted: format_amount(amount, currency),
        }
    }
}

/// The `{base, taxes, total}` shown in summaries and charged at payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceBreakdown {
    pub base: Money,
    pub taxes: Money,
    pub total: Money,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Tax share applied to legacy fares
    pub tax_rate: f64,

    /// Used when the flight record names no currency
    pub default_currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.18,
            default_currency: "INR".to_string(),
        }
    }
}

/// Single source of the booking price.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn resolve_currency(&self, flight: &FlightSelection) -> String {
        flight
            .declared_currency()
            .map(|c| c.trim().to_uppercase())
            .unwrap_or_else(|| self.config.default_currency.clone())
    }

    /// Breakdown for a selected flight. A structured `pricing` block on the record
    /// is authoritative and passed through untouched; legacy records get taxes
    /// derived from `finalPrice`.
    pub fn compute_breakdown(&self, flight: &FlightSelection, passenger_count: usize) -> PriceBreakdown {
        if passenger_count != flight.travellers() {
            warn!(
                "Pricing {} for {} passengers but search declared {}",
                flight.flight_number,
                passenger_count,
                flight.travellers()
            );
        }

        let currency = self.resolve_currency(flight);

        if let Some(pricing) = &flight.pricing {
            debug!("Using stored pricing block for {}", flight.flight_number);
            return PriceBreakdown {
                base: Money { amount: pricing.base.amount, formatted: pricing.base.formatted.clone() },
                taxes: Money { amount: pricing.taxes.amount, formatted: pricing.taxes.formatted.clone() },
                total: Money { amount: pricing.total.amount, formatted: pricing.total.formatted.clone() },
                currency,
            };
        }

        // Fare already covers the whole party; only taxes are rounded.
        let base = flight.legacy_fare();
        let taxes = (base * self.config.tax_rate).round();
        let total = base + taxes;
        debug!("Derived legacy pricing for {}: base={} taxes={}", flight.flight_number, base, taxes);

        PriceBreakdown {
            base: Money::new(base, &currency),
            taxes: Money::new(taxes, &currency),
            total: Money::new(total, &currency),
            currency,
        }
    }
}
