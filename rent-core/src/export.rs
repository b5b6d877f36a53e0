//! Projection of a finished quote into display rows for document export.
//!
//! [`format`] only formats values already present on the input and result;
//! it never recomputes anything. Rendering the rows into a file is left to a
//! [`DocumentRenderer`].

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::calculations::common::format_rand;
use crate::models::{CalculationInput, CalculationResult};

pub const EXPORT_TITLE: &str = "SmartRent Auto - Calculation Summary";

/// File name stem used when the caller does not choose one.
pub const EXPORT_FILE_STEM: &str = "SmartRentAuto_Calculation";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to render document: {0}")]
    Render(String),

    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub label: &'static str,
    pub value: String,
}

impl ExportRow {
    fn new(
        label: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }

    fn money(
        label: &'static str,
        value: Decimal,
    ) -> Self {
        Self::new(label, format_rand(value))
    }
}

/// Turns a titled list of rows into document bytes.
pub trait DocumentRenderer {
    /// File extension without the leading dot.
    fn extension(&self) -> &'static str;

    fn render(
        &self,
        title: &str,
        rows: &[ExportRow],
    ) -> Result<Vec<u8>, ExportError>;

    fn default_file_name(&self) -> String {
        format!("{EXPORT_FILE_STEM}.{}", self.extension())
    }
}

/// Every input and result field in display order.
pub fn format(
    input: &CalculationInput,
    result: &CalculationResult,
) -> Vec<ExportRow> {
    let optional_money = |value: Option<Decimal>| value.map(format_rand).unwrap_or_default();

    let repo_cost = if result.repo_cost_waived {
        format!("{} (waived)", format_rand(result.repo_cost))
    } else {
        format_rand(result.repo_cost)
    };

    vec![
        ExportRow::new("Client Name", input.client_name.clone()),
        ExportRow::money("Vehicle Price", input.vehicle_price),
        ExportRow::money("Retail Value", input.retail_value),
        ExportRow::new("Suburb", input.suburb.name.clone()),
        ExportRow::new("Town", input.suburb.town.clone()),
        ExportRow::new("Municipality", input.suburb.municipality.clone()),
        ExportRow::new("Province", input.suburb.province.clone()),
        ExportRow::new("Distance (km)", input.suburb.distance_km.normalize().to_string()),
        ExportRow::new("Risk Profile", input.risk_profile.as_str()),
        ExportRow::new(
            "Credit Score",
            input.credit_score.map(|s| s.to_string()).unwrap_or_default(),
        ),
        ExportRow::money("Loading", result.loading),
        ExportRow::money("Risk Factor", result.risk_factor),
        ExportRow::money("Total Rental Amount", result.total_rental_amount),
        ExportRow::new("Repo Cost", repo_cost),
        ExportRow::money("Threshold Excess", result.threshold_excess),
        ExportRow::money("Deposit Floor", result.deposit_floor),
        ExportRow::new("Manual Deposit", optional_money(input.manual_deposit)),
        ExportRow::money("Deposit", result.deposit),
        ExportRow::money("Net Rental Amount", result.net_rental_amount),
        ExportRow::money("License & Registration", result.license_and_registration),
        ExportRow::money("Document Fees", result.document_fees),
        ExportRow::money("Upfront Cost", result.upfront_cost),
        ExportRow::new("Terms (months)", input.term_months.to_string()),
        ExportRow::money("Monthly Base Payment", result.monthly_base_payment),
        ExportRow::money("Monthly Insurance", result.monthly_insurance),
        ExportRow::money("Profit Margin", result.profit_margin),
        ExportRow::money("Other Fee", result.other_fee),
        ExportRow::money("Monthly Installment", result.monthly_installment),
    ]
}
