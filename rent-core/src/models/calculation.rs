use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{RiskProfile, SuburbRecord};

/// A validated quote request. Built fresh for every submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    pub client_name: String,
    pub vehicle_price: Decimal,
    /// Retail ("M&M") value of the vehicle; drives the insurance premium.
    pub retail_value: Decimal,
    pub suburb: SuburbRecord,
    pub risk_profile: RiskProfile,
    pub manual_deposit: Option<Decimal>,
    pub term_months: u32,
    pub credit_score: Option<u16>,
}

/// Every quantity the pricing engine derives, unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub loading: Decimal,
    pub risk_factor: Decimal,
    pub total_rental_amount: Decimal,
    pub repo_cost: Decimal,
    pub repo_cost_waived: bool,
    pub threshold_excess: Decimal,
    pub deposit_floor: Decimal,
    pub deposit: Decimal,
    pub net_rental_amount: Decimal,

    // Fixed fees in force when the quote was priced
    pub license_and_registration: Decimal,
    pub document_fees: Decimal,
    pub other_fee: Decimal,

    pub upfront_cost: Decimal,
    pub monthly_base_payment: Decimal,
    pub monthly_insurance: Decimal,
    pub profit_margin: Decimal,
    pub monthly_installment: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: CalculationInput,
    pub result: CalculationResult,
    pub timestamp: DateTime<Utc>,
}
