use thiserror::Error;

use crate::db::store::StoreError;
use crate::validation::FieldErrors;

/// Why a quote submission did not produce a result.
///
/// Every variant leaves the history exactly as it was before the submit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// One or more form fields failed validation; nothing was priced.
    #[error("Please correct the highlighted fields: {0}")]
    Validation(FieldErrors),

    /// The history is full and the session has not been unlocked.
    #[error("Maximum of {max_entries} calculations reached. Please wait or activate admin mode.")]
    Capacity { max_entries: usize },

    #[error("History storage failed: {0}")]
    Storage(#[from] StoreError),
}
