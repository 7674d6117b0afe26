pub mod currency;
pub mod pricing;

pub use currency::format_amount;
pub use pricing::{Money, PriceBreakdown, PricingConfig, PricingEngine};
