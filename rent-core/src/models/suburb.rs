use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single suburb from the directory, normalised to one schema regardless of
/// which column names the source file used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuburbRecord {
    pub name: String,
    pub town: String,
    pub municipality: String,
    pub province: String,
    /// Road distance from the depot, in kilometres.
    pub distance_km: Decimal,
}
