//! Pricing calculations for rent-to-own vehicle quotes.
//!
//! [`pricing`] holds the worksheet itself; [`common`] holds the rounding and
//! currency helpers applied when values are presented.

pub mod common;
pub mod pricing;

pub use pricing::{PricingConfig, PricingConfigError, PricingEngine};
