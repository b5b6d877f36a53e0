mod calculation;
mod risk_profile;
mod suburb;

pub use calculation::{CalculationInput, CalculationResult, HistoryEntry};
pub use risk_profile::RiskProfile;
pub use suburb::SuburbRecord;
