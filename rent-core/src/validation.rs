//! Input validation for quote requests.
//!
//! The form arrives as raw strings (whatever the user typed) together with the
//! result of the suburb lookup. [`validate`] either produces a
//! [`CalculationInput`] or reports every failing field at once; it never stops
//! at the first problem and never touches shared state.
//!
//! ## Usage
//! ```rust
//! use rent_core::validation::{Field, QuoteForm, validate};
//!
//! let form = QuoteForm {
//!     client_name: String::new(),
//!     vehicle_price: "-5".to_string(),
//!     ..QuoteForm::default()
//! };
//!
//! let errors = validate(&form, None).unwrap_err();
//! assert!(errors.get(Field::ClientName).is_some());
//! assert!(errors.get(Field::VehiclePrice).is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::format_rand;
use crate::models::{CalculationInput, RiskProfile, SuburbRecord};

/// Highest credit score a bureau reports.
pub const MAX_CREDIT_SCORE: u16 = 999;

/// Largest magnitude accepted for any Rand amount on the form.
///
/// Pricing multiplies and sums these values, so they are kept well inside
/// the range `Decimal` can represent.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0); // 1_000_000_000_000

/// Longest repossession distance a directory record may carry.
pub const MAX_DISTANCE_KM: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Raw, string-typed quote form as captured from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteForm {
    pub client_name: String,
    pub vehicle_price: String,
    pub retail_value: String,
    /// Free text typed into the suburb field; only a directory selection
    /// makes it valid.
    pub suburb: String,
    pub risk_profile: String,
    pub manual_deposit: String,
    pub term_months: String,
    pub credit_score: String,
}

/// Form fields, in the order they appear on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    ClientName,
    VehiclePrice,
    RetailValue,
    Suburb,
    RiskProfile,
    TermMonths,
    CreditScore,
    ManualDeposit,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::ClientName => "Client Name",
            Field::VehiclePrice => "Vehicle Price",
            Field::RetailValue => "Retail (M&M) Value",
            Field::Suburb => "Suburb",
            Field::RiskProfile => "Risk Profile",
            Field::TermMonths => "Terms (months)",
            Field::CreditScore => "Credit Score",
            Field::ManualDeposit => "Manual Deposit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One message per failing field, iterated in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{count} field(s) failed validation", count = .0.len())]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure; a field keeps its first message.
    pub fn insert(
        &mut self,
        field: Field,
        message: impl Into<String>,
    ) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(
        &self,
        field: Field,
    ) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

/// Trims whitespace and removes `,` thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// `Ok(None)` for blank input, `Err(())` when non-blank input is not a number.
///
/// Scientific notation (`2e5`) is accepted as well as plain decimals.
fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ()> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map(Some)
        .map_err(|e| {
            debug!(input = %s, "invalid decimal: {}", e);
        })
}

fn exceeds_limit(field: Field) -> String {
    format!("{field} must not exceed {}.", format_rand(MAX_AMOUNT))
}

fn parse_positive_decimal(s: &str) -> Option<Decimal> {
    match parse_optional_decimal(s) {
        Ok(Some(value)) if value > Decimal::ZERO => Some(value),
        _ => None,
    }
}

fn parse_whole_number<T>(
    s: &str,
    convert: impl Fn(&Decimal) -> Option<T>,
) -> Result<Option<T>, ()> {
    match parse_optional_decimal(s)? {
        None => Ok(None),
        Some(value) if value.fract().is_zero() => convert(&value).map(Some).ok_or(()),
        Some(_) => Err(()),
    }
}

/// Validates `form` against the field rules.
///
/// `selected_suburb` is the directory record the user picked, if any. Free
/// text in `form.suburb` that was never resolved to a record is rejected.
///
/// # Errors
///
/// Returns [`FieldErrors`] naming every field that failed, each with a
/// user-facing message.
pub fn validate(
    form: &QuoteForm,
    selected_suburb: Option<&SuburbRecord>,
) -> Result<CalculationInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let client_name = form.client_name.trim();
    if client_name.is_empty() {
        errors.insert(Field::ClientName, "Client Name is required.");
    }

    let vehicle_price = match parse_positive_decimal(&form.vehicle_price) {
        Some(price) if price <= MAX_AMOUNT => Some(price),
        Some(_) => {
            errors.insert(Field::VehiclePrice, exceeds_limit(Field::VehiclePrice));
            None
        }
        None => {
            errors.insert(
                Field::VehiclePrice,
                "Vehicle Price must be a valid number greater than 0.",
            );
            None
        }
    };

    let retail_value = match parse_positive_decimal(&form.retail_value) {
        Some(value) if value <= MAX_AMOUNT => Some(value),
        Some(_) => {
            errors.insert(Field::RetailValue, exceeds_limit(Field::RetailValue));
            None
        }
        None => {
            errors.insert(
                Field::RetailValue,
                "Retail (M&M) Value must be a valid number greater than 0.",
            );
            None
        }
    };

    match selected_suburb {
        Some(suburb)
            if suburb.distance_km.is_sign_negative() || suburb.distance_km > MAX_DISTANCE_KM =>
        {
            errors.insert(
                Field::Suburb,
                "Selected Suburb has an invalid repossession distance.",
            );
        }
        Some(_) => {}
        None if form.suburb.trim().is_empty() => {
            errors.insert(Field::Suburb, "Please select a Suburb.");
        }
        None => {
            errors.insert(
                Field::Suburb,
                "Selected Suburb is invalid or not found in the directory.",
            );
        }
    }

    let risk_profile = RiskProfile::parse(&form.risk_profile);
    if risk_profile.is_none() {
        if form.risk_profile.trim().is_empty() {
            errors.insert(Field::RiskProfile, "Please select a Risk Profile.");
        } else {
            errors.insert(
                Field::RiskProfile,
                "Risk Profile must be one of Low, Medium or High.",
            );
        }
    }

    let term_months = match parse_whole_number(&form.term_months, Decimal::to_u32) {
        Ok(Some(months)) if months > 0 => Some(months),
        _ => {
            errors.insert(
                Field::TermMonths,
                "Terms must be a whole number of months greater than 0.",
            );
            None
        }
    };

    let credit_score = match parse_whole_number(&form.credit_score, Decimal::to_u16) {
        Ok(score) if score.is_none_or(|s| s <= MAX_CREDIT_SCORE) => score,
        _ => {
            errors.insert(
                Field::CreditScore,
                format!("Credit Score must be a number between 0 and {MAX_CREDIT_SCORE}."),
            );
            None
        }
    };

    let manual_deposit = match parse_optional_decimal(&form.manual_deposit) {
        Ok(Some(deposit)) if deposit.abs() > MAX_AMOUNT => {
            errors.insert(Field::ManualDeposit, exceeds_limit(Field::ManualDeposit));
            None
        }
        Ok(deposit) => deposit,
        Err(()) => {
            errors.insert(Field::ManualDeposit, "Manual Deposit must be a valid number.");
            None
        }
    };

    match (vehicle_price, retail_value, selected_suburb, risk_profile, term_months) {
        (Some(vehicle_price), Some(retail_value), Some(suburb), Some(risk_profile), Some(term_months))
            if errors.is_empty() =>
        {
            Ok(CalculationInput {
                client_name: client_name.to_string(),
                vehicle_price,
                retail_value,
                suburb: suburb.clone(),
                risk_profile,
                manual_deposit,
                term_months,
                credit_score,
            })
        }
        _ => {
            debug!(fields = ?errors.fields().collect::<Vec<_>>(), "quote form rejected");
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn suburb() -> SuburbRecord {
        SuburbRecord {
            name: "Soweto".to_string(),
            town: "Johannesburg".to_string(),
            municipality: "City of Johannesburg".to_string(),
            province: "Gauteng".to_string(),
            distance_km: dec!(50),
        }
    }

    fn valid_form() -> QuoteForm {
        QuoteForm {
            client_name: "Thandi Mokoena".to_string(),
            vehicle_price: "200000".to_string(),
            retail_value: "180000".to_string(),
            suburb: "Soweto".to_string(),
            risk_profile: "Medium".to_string(),
            manual_deposit: String::new(),
            term_months: "48".to_string(),
            credit_score: String::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Happy path
    // -----------------------------------------------------------------------

    #[test]
    fn valid_form_produces_input() {
        let suburb = suburb();
        let input = validate(&valid_form(), Some(&suburb)).expect("form is valid");

        assert_eq!(
            input,
            CalculationInput {
                client_name: "Thandi Mokoena".to_string(),
                vehicle_price: dec!(200000),
                retail_value: dec!(180000),
                suburb: suburb.clone(),
                risk_profile: RiskProfile::Medium,
                manual_deposit: None,
                term_months: 48,
                credit_score: None,
            }
        );
    }

    #[test]
    fn numbers_tolerate_whitespace_and_thousands_separators() {
        let form = QuoteForm {
            vehicle_price: " 1,250,000.50 ".to_string(),
            manual_deposit: "25,000".to_string(),
            credit_score: "650".to_string(),
            term_months: " 60 ".to_string(),
            ..valid_form()
        };

        let input = validate(&form, Some(&suburb())).unwrap();

        assert_eq!(input.vehicle_price, dec!(1250000.50));
        assert_eq!(input.manual_deposit, Some(dec!(25000)));
        assert_eq!(input.credit_score, Some(650));
        assert_eq!(input.term_months, 60);
    }

    #[test]
    fn client_name_is_trimmed() {
        let form = QuoteForm {
            client_name: "  Sipho  ".to_string(),
            ..valid_form()
        };

        assert_eq!(validate(&form, Some(&suburb())).unwrap().client_name, "Sipho");
    }

    // -----------------------------------------------------------------------
    // Error collection
    // -----------------------------------------------------------------------

    #[test]
    fn empty_name_and_negative_price_yield_exactly_two_errors() {
        let form = QuoteForm {
            client_name: String::new(),
            vehicle_price: "-5".to_string(),
            ..valid_form()
        };

        let errors = validate(&form, Some(&suburb())).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(Field::ClientName), Some("Client Name is required."));
        assert_eq!(
            errors.get(Field::VehiclePrice),
            Some("Vehicle Price must be a valid number greater than 0.")
        );
    }

    #[test]
    fn empty_form_reports_every_required_field_in_form_order() {
        let errors = validate(&QuoteForm::default(), None).unwrap_err();

        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![
                Field::ClientName,
                Field::VehiclePrice,
                Field::RetailValue,
                Field::Suburb,
                Field::RiskProfile,
                Field::TermMonths,
            ]
        );
    }

    #[test]
    fn zero_and_garbage_values_are_rejected() {
        let form = QuoteForm {
            vehicle_price: "0".to_string(),
            retail_value: "abc".to_string(),
            ..valid_form()
        };

        let errors = validate(&form, Some(&suburb())).unwrap_err();

        assert!(errors.get(Field::VehiclePrice).is_some());
        assert!(errors.get(Field::RetailValue).is_some());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn scientific_notation_is_accepted() {
        let form = QuoteForm {
            vehicle_price: "2e5".to_string(),
            retail_value: "1.8E5".to_string(),
            ..valid_form()
        };

        let input = validate(&form, Some(&suburb())).unwrap();

        assert_eq!(input.vehicle_price, dec!(200000));
        assert_eq!(input.retail_value, dec!(180000));
    }

    #[test]
    fn amounts_above_the_limit_are_rejected() {
        let form = QuoteForm {
            vehicle_price: "79228162514264337593543950335".to_string(),
            retail_value: "1,000,000,000,000.01".to_string(),
            manual_deposit: "-79228162514264337593543950335".to_string(),
            ..valid_form()
        };

        let errors = validate(&form, Some(&suburb())).unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.get(Field::VehiclePrice),
            Some("Vehicle Price must not exceed R1,000,000,000,000.00.")
        );
        assert_eq!(
            errors.get(Field::RetailValue),
            Some("Retail (M&M) Value must not exceed R1,000,000,000,000.00.")
        );
        assert_eq!(
            errors.get(Field::ManualDeposit),
            Some("Manual Deposit must not exceed R1,000,000,000,000.00.")
        );
    }

    #[test]
    fn amounts_at_the_limit_are_accepted() {
        let form = QuoteForm {
            vehicle_price: "1000000000000".to_string(),
            manual_deposit: "-1000000000000".to_string(),
            ..valid_form()
        };

        let input = validate(&form, Some(&suburb())).unwrap();

        assert_eq!(input.vehicle_price, MAX_AMOUNT);
        assert_eq!(input.manual_deposit, Some(-MAX_AMOUNT));
    }

    // -----------------------------------------------------------------------
    // Suburb selection
    // -----------------------------------------------------------------------

    #[test]
    fn blank_suburb_asks_for_selection() {
        let form = QuoteForm {
            suburb: String::new(),
            ..valid_form()
        };

        let errors = validate(&form, None).unwrap_err();

        assert_eq!(errors.get(Field::Suburb), Some("Please select a Suburb."));
    }

    #[test]
    fn unresolved_free_text_suburb_is_rejected() {
        let errors = validate(&valid_form(), None).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(Field::Suburb),
            Some("Selected Suburb is invalid or not found in the directory.")
        );
    }

    #[test]
    fn suburb_with_out_of_range_distance_is_rejected() {
        let far = SuburbRecord {
            distance_km: dec!(100000.1),
            ..suburb()
        };

        let errors = validate(&valid_form(), Some(&far)).unwrap_err();

        assert_eq!(
            errors.get(Field::Suburb),
            Some("Selected Suburb has an invalid repossession distance.")
        );
    }

    // -----------------------------------------------------------------------
    // Risk profile
    // -----------------------------------------------------------------------

    #[test]
    fn unknown_risk_profile_is_rejected() {
        let form = QuoteForm {
            risk_profile: "Extreme".to_string(),
            ..valid_form()
        };

        let errors = validate(&form, Some(&suburb())).unwrap_err();

        assert_eq!(
            errors.get(Field::RiskProfile),
            Some("Risk Profile must be one of Low, Medium or High.")
        );
    }

    #[test]
    fn risk_profile_is_case_insensitive() {
        let form = QuoteForm {
            risk_profile: "high".to_string(),
            ..valid_form()
        };

        assert_eq!(
            validate(&form, Some(&suburb())).unwrap().risk_profile,
            RiskProfile::High
        );
    }

    // -----------------------------------------------------------------------
    // Term
    // -----------------------------------------------------------------------

    #[test]
    fn fractional_or_zero_term_is_rejected() {
        for term in ["0", "12.5", "-12", "twelve", ""] {
            let form = QuoteForm {
                term_months: term.to_string(),
                ..valid_form()
            };

            let errors = validate(&form, Some(&suburb())).unwrap_err();

            assert!(
                errors.get(Field::TermMonths).is_some(),
                "term {term:?} should be rejected"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Credit score
    // -----------------------------------------------------------------------

    #[test]
    fn credit_score_bounds_are_inclusive() {
        for score in ["0", "999"] {
            let form = QuoteForm {
                credit_score: score.to_string(),
                ..valid_form()
            };
            assert!(validate(&form, Some(&suburb())).is_ok(), "score {score} is valid");
        }
    }

    #[test]
    fn credit_score_out_of_range_is_rejected() {
        for score in ["1000", "-1", "abc", "650.5"] {
            let form = QuoteForm {
                credit_score: score.to_string(),
                ..valid_form()
            };

            let errors = validate(&form, Some(&suburb())).unwrap_err();

            assert_eq!(
                errors.get(Field::CreditScore),
                Some("Credit Score must be a number between 0 and 999."),
                "score {score:?}"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Manual deposit
    // -----------------------------------------------------------------------

    #[test]
    fn unparseable_manual_deposit_is_rejected() {
        let form = QuoteForm {
            manual_deposit: "ten thousand".to_string(),
            ..valid_form()
        };

        let errors = validate(&form, Some(&suburb())).unwrap_err();

        assert_eq!(
            errors.get(Field::ManualDeposit),
            Some("Manual Deposit must be a valid number.")
        );
    }

    #[test]
    fn blank_manual_deposit_means_none() {
        let form = QuoteForm {
            manual_deposit: "   ".to_string(),
            ..valid_form()
        };

        assert_eq!(validate(&form, Some(&suburb())).unwrap().manual_deposit, None);
    }

    #[test]
    fn field_errors_display_counts_fields() {
        let errors = validate(&QuoteForm::default(), None).unwrap_err();

        assert_eq!(errors.to_string(), "6 field(s) failed validation");
    }
}
