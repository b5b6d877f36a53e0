//! Rent-to-own pricing worksheet.
//!
//! Turns a validated [`CalculationInput`] into a [`CalculationResult`]. The
//! pipeline is pure and deterministic; nothing is rounded until the result is
//! presented.
//!
//! # Worksheet Structure
//!
//! | Step | Quantity | Formula |
//! |------|----------|---------|
//! | 1    | Loading | vehicle price × loading rate (10%) |
//! | 2    | Risk factor | loading × tier multiplier (Low 0.9, Medium 1.0, High 1.1) |
//! | 3    | Total rental amount | vehicle price + risk factor |
//! | 4    | Repo cost | distance × R10/km, waived below R2,000 |
//! | 5    | Threshold excess | total rental − R110,000 cap + R4,000 buffer |
//! | 6    | Deposit floor | threshold excess + repo cost |
//! | 7    | Deposit | manual deposit, else deposit floor |
//! | 8    | Net rental amount | total rental − (deposit + repo cost) |
//! | 9    | Upfront cost | net rental + licence & registration + document fees |
//! | 10   | Monthly base payment | upfront cost ÷ term |
//! | 11   | Monthly insurance | retail value × 0.8167% |
//! | 12   | Profit margin | monthly base × 1.05 |
//! | 13   | Monthly installment | base + insurance + margin + other fee (R580) |
//!
//! The threshold excess is allowed to go negative; it is not clamped.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use rent_core::calculations::{PricingConfig, PricingEngine};
//! use rent_core::calculations::common::round_half_up;
//! use rent_core::{CalculationInput, RiskProfile, SuburbRecord};
//!
//! let engine = PricingEngine::new(PricingConfig::default()).unwrap();
//! let input = CalculationInput {
//!     client_name: "T. Mokoena".to_string(),
//!     vehicle_price: dec!(200000),
//!     retail_value: dec!(180000),
//!     suburb: SuburbRecord {
//!         name: "Soweto".to_string(),
//!         town: "Johannesburg".to_string(),
//!         municipality: "City of Johannesburg".to_string(),
//!         province: "Gauteng".to_string(),
//!         distance_km: dec!(50),
//!     },
//!     risk_profile: RiskProfile::Medium,
//!     manual_deposit: None,
//!     term_months: 48,
//!     credit_score: None,
//! };
//!
//! let result = engine.price(&input);
//!
//! assert_eq!(result.deposit, dec!(114000));
//! assert_eq!(round_half_up(result.monthly_installment), dec!(6747.98));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{CalculationInput, CalculationResult, RiskProfile};

/// Errors raised when a [`PricingConfig`] holds values the worksheet cannot use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingConfigError {
    /// A rate or multiplier that must be positive was zero or negative.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: Decimal },

    /// A fee, cap or threshold that must not be negative was negative.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    /// A value above the range the worksheet can carry without overflow.
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },
}

/// Upper bound for rates and multipliers.
const MAX_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Upper bound for fees, caps and thresholds.
const MAX_FEE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Constants of the pricing worksheet.
///
/// [`Default`] carries the production figures; a configuration file may
/// override any of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Share of the vehicle price charged as loading (Step 1).
    pub loading_rate: Decimal,

    /// Loading multiplier for each risk tier (Step 2).
    pub low_risk_multiplier: Decimal,
    pub medium_risk_multiplier: Decimal,
    pub high_risk_multiplier: Decimal,

    /// Repossession cost per kilometre of distance to the depot (Step 4).
    pub repo_cost_per_km: Decimal,

    /// Raw repo costs strictly below this amount are waived.
    pub repo_waiver_threshold: Decimal,

    /// Statutory ceiling on the recoverable rental amount (Step 5).
    pub regulatory_cap: Decimal,

    /// Fixed buffer added back on top of the cap excess (Step 5).
    pub cap_buffer: Decimal,

    pub license_and_registration: Decimal,
    pub document_fees: Decimal,

    /// Monthly insurance premium as a share of the retail value (Step 11).
    pub insurance_rate: Decimal,

    /// Multiplier applied to the monthly base payment (Step 12).
    pub profit_margin_factor: Decimal,

    /// Fixed monthly surcharge (Step 13).
    pub other_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            loading_rate: Decimal::new(10, 2),
            low_risk_multiplier: Decimal::new(9, 1),
            medium_risk_multiplier: Decimal::ONE,
            high_risk_multiplier: Decimal::new(11, 1),
            repo_cost_per_km: Decimal::from(10),
            repo_waiver_threshold: Decimal::from(2000),
            regulatory_cap: Decimal::from(110_000),
            cap_buffer: Decimal::from(4000),
            license_and_registration: Decimal::from(2500),
            document_fees: Decimal::from(1500),
            insurance_rate: Decimal::new(8167, 6),
            profit_margin_factor: Decimal::new(105, 2),
            other_fee: Decimal::from(580),
        }
    }
}

impl PricingConfig {
    /// Multiplier applied to the loading for a given tier.
    pub fn risk_multiplier(
        &self,
        profile: RiskProfile,
    ) -> Decimal {
        match profile {
            RiskProfile::Low => self.low_risk_multiplier,
            RiskProfile::Medium => self.medium_risk_multiplier,
            RiskProfile::High => self.high_risk_multiplier,
        }
    }

    /// Validates the configuration values.
    ///
    /// Rates and multipliers must be positive and at most 100; fees, caps and
    /// thresholds must lie in `0..=1_000_000_000`. The first offending field
    /// is reported.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use rent_core::calculations::{PricingConfig, PricingConfigError};
    ///
    /// let config = PricingConfig {
    ///     other_fee: dec!(-1),
    ///     ..PricingConfig::default()
    /// };
    ///
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(PricingConfigError::Negative { field: "other_fee", value: dec!(-1) })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), PricingConfigError> {
        let positive = [
            ("loading_rate", self.loading_rate),
            ("low_risk_multiplier", self.low_risk_multiplier),
            ("medium_risk_multiplier", self.medium_risk_multiplier),
            ("high_risk_multiplier", self.high_risk_multiplier),
            ("repo_cost_per_km", self.repo_cost_per_km),
            ("insurance_rate", self.insurance_rate),
            ("profit_margin_factor", self.profit_margin_factor),
        ];
        if let Some((field, value)) = positive.into_iter().find(|(_, v)| *v <= Decimal::ZERO) {
            return Err(PricingConfigError::NotPositive { field, value });
        }
        if let Some((field, value)) = positive.into_iter().find(|(_, v)| *v > MAX_RATE) {
            return Err(PricingConfigError::TooLarge {
                field,
                value,
                max: MAX_RATE,
            });
        }

        let non_negative = [
            ("repo_waiver_threshold", self.repo_waiver_threshold),
            ("regulatory_cap", self.regulatory_cap),
            ("cap_buffer", self.cap_buffer),
            ("license_and_registration", self.license_and_registration),
            ("document_fees", self.document_fees),
            ("other_fee", self.other_fee),
        ];
        if let Some((field, value)) = non_negative.into_iter().find(|(_, v)| v.is_sign_negative())
        {
            return Err(PricingConfigError::Negative { field, value });
        }
        if let Some((field, value)) = non_negative.into_iter().find(|(_, v)| *v > MAX_FEE) {
            return Err(PricingConfigError::TooLarge {
                field,
                value,
                max: MAX_FEE,
            });
        }

        Ok(())
    }
}

/// Calculator for the rent-to-own pricing worksheet.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Builds an engine after validating `config`.
    pub fn new(config: PricingConfig) -> Result<Self, PricingConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Runs every worksheet step for `input`.
    ///
    /// Infallible: the validator guarantees a positive price, retail value and
    /// term, so the division in Step 10 cannot be by zero. Form amounts and
    /// configured constants are both bounded, which keeps every step inside
    /// the `Decimal` range.
    pub fn price(
        &self,
        input: &CalculationInput,
    ) -> CalculationResult {
        let cfg = &self.config;

        let loading = self.calculate_loading(input.vehicle_price);
        let risk_factor = loading * cfg.risk_multiplier(input.risk_profile);
        let total_rental_amount = input.vehicle_price + risk_factor;

        let (repo_cost, repo_cost_waived) = self.calculate_repo_cost(input.suburb.distance_km);

        let threshold_excess = self.calculate_threshold_excess(total_rental_amount);
        let deposit_floor = threshold_excess + repo_cost;
        let deposit = input.manual_deposit.unwrap_or(deposit_floor);

        let net_rental_amount = total_rental_amount - (deposit + repo_cost);
        let upfront_cost = net_rental_amount + cfg.license_and_registration + cfg.document_fees;

        let monthly_base_payment = upfront_cost / Decimal::from(input.term_months);
        let monthly_insurance = input.retail_value * cfg.insurance_rate;
        let profit_margin = monthly_base_payment * cfg.profit_margin_factor;
        let monthly_installment =
            monthly_base_payment + monthly_insurance + profit_margin + cfg.other_fee;

        debug!(
            client = %input.client_name,
            risk = %input.risk_profile,
            %total_rental_amount,
            %repo_cost,
            %deposit,
            "priced quote"
        );

        CalculationResult {
            loading,
            risk_factor,
            total_rental_amount,
            repo_cost,
            repo_cost_waived,
            threshold_excess,
            deposit_floor,
            deposit,
            net_rental_amount,
            license_and_registration: cfg.license_and_registration,
            document_fees: cfg.document_fees,
            other_fee: cfg.other_fee,
            upfront_cost,
            monthly_base_payment,
            monthly_insurance,
            profit_margin,
            monthly_installment,
        }
    }

    /// Step 1: loading on the vehicle price.
    pub fn calculate_loading(
        &self,
        vehicle_price: Decimal,
    ) -> Decimal {
        vehicle_price * self.config.loading_rate
    }

    /// Step 4: distance-based repo cost and whether it was waived.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use rent_core::calculations::{PricingConfig, PricingEngine};
    ///
    /// let engine = PricingEngine::new(PricingConfig::default()).unwrap();
    ///
    /// assert_eq!(engine.calculate_repo_cost(dec!(199.9)), (dec!(0), true));
    /// assert_eq!(engine.calculate_repo_cost(dec!(200)), (dec!(2000), false));
    /// ```
    pub fn calculate_repo_cost(
        &self,
        distance_km: Decimal,
    ) -> (Decimal, bool) {
        let raw = distance_km * self.config.repo_cost_per_km;
        if raw < self.config.repo_waiver_threshold {
            (Decimal::ZERO, true)
        } else {
            (raw, false)
        }
    }

    /// Step 5: amount by which the rental exceeds the regulatory cap, plus the
    /// fixed buffer. May be negative.
    pub fn calculate_threshold_excess(
        &self,
        total_rental_amount: Decimal,
    ) -> Decimal {
        total_rental_amount - self.config.regulatory_cap + self.config.cap_buffer
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self {
            config: PricingConfig::default(),
        }
    }
}
