use std::fmt::Write as _;

use chrono::Local;
use clap::Args;
use rent_core::calculations::common::format_rand;
use rent_core::db::{MemoryStoreFactory, StoreRegistry};
use rent_core::export;
use rent_core::session::QuoteSession;
use rent_core::validation::QuoteForm;
use rent_core::{HistoryEntry, KeyValueStore, QuoteError, SuburbDirectory, SuburbRecord};
use rent_db_sqlite::SqliteStoreFactory;
use tracing::debug;

/// Registry with every storage backend this binary ships.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(SqliteStoreFactory));
    registry.register(Box::new(MemoryStoreFactory));
    registry
}

/// Raw quote request. Values are kept as typed so the validator can report
/// on them.
#[derive(Debug, Clone, Default, Args)]
pub struct QuoteArgs {
    /// Client's full name
    #[arg(long)]
    pub client: String,

    /// Vehicle price in Rand
    #[arg(long, allow_hyphen_values = true)]
    pub price: String,

    /// Retail (M&M) value in Rand
    #[arg(long, allow_hyphen_values = true)]
    pub retail: String,

    /// Suburb name as listed in the directory
    #[arg(long)]
    pub suburb: String,

    /// Town, to pick between suburbs with the same name
    #[arg(long)]
    pub town: Option<String>,

    /// Risk profile: Low, Medium or High
    #[arg(long)]
    pub risk: String,

    /// Contract term in months
    #[arg(long, allow_hyphen_values = true)]
    pub terms: String,

    /// Deposit to use instead of the calculated minimum
    #[arg(long, allow_hyphen_values = true)]
    pub deposit: Option<String>,

    /// Client's credit score (0-999)
    #[arg(long, allow_hyphen_values = true)]
    pub credit_score: Option<String>,
}

impl QuoteArgs {
    pub fn to_form(&self) -> QuoteForm {
        QuoteForm {
            client_name: self.client.clone(),
            vehicle_price: self.price.clone(),
            retail_value: self.retail.clone(),
            suburb: self.suburb.clone(),
            risk_profile: self.risk.clone(),
            manual_deposit: self.deposit.clone().unwrap_or_default(),
            term_months: self.terms.clone(),
            credit_score: self.credit_score.clone().unwrap_or_default(),
        }
    }
}

/// Resolves the suburb against the directory and submits the quote.
pub async fn submit_quote<S: KeyValueStore>(
    session: &mut QuoteSession<S>,
    directory: &SuburbDirectory,
    args: &QuoteArgs,
) -> Result<HistoryEntry, QuoteError> {
    let suburb = directory.resolve(&args.suburb, args.town.as_deref());
    debug!(suburb = %args.suburb, found = suburb.is_some(), "resolved suburb");
    session.submit(&args.to_form(), suburb).await
}

/// One `label: value` line per export row.
pub fn render_summary(entry: &HistoryEntry) -> String {
    let rows = export::format(&entry.input, &entry.result);
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);

    let mut out = String::new();
    for row in rows {
        let _ = writeln!(out, "{:<width$}  {}", row.label, row.value);
    }
    out
}

pub fn render_validation_errors(err: &QuoteError) -> String {
    let mut out = String::new();
    if let QuoteError::Validation(errors) = err {
        for (field, message) in errors.iter() {
            let _ = writeln!(out, "  - {field}: {message}");
        }
    }
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No calculations in history.\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}  {:<24} {:<12} {:>6} {:>14}",
            entry.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            entry.input.client_name,
            entry.input.suburb.name,
            entry.input.risk_profile.as_str(),
            format_rand(entry.result.monthly_installment),
        );
    }
    out
}

pub fn render_suburbs(matches: &[&SuburbRecord]) -> String {
    if matches.is_empty() {
        return "No matching suburbs.\n".to_string();
    }

    let mut out = String::new();
    for suburb in matches {
        let _ = writeln!(
            out,
            "{}, {} ({}, {}) - {} km",
            suburb.name,
            suburb.town,
            suburb.municipality,
            suburb.province,
            suburb.distance_km.normalize(),
        );
    }
    out
}
