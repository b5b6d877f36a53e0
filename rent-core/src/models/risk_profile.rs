use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskProfile {
    Low,
    Medium,
    High,
}

impl RiskProfile {
    pub fn all() -> &'static [RiskProfile] {
        &[RiskProfile::Low, RiskProfile::Medium, RiskProfile::High]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Case-insensitive, whitespace-tolerant parse of a tier name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(RiskProfile::parse("low"), Some(RiskProfile::Low));
        assert_eq!(RiskProfile::parse("MEDIUM"), Some(RiskProfile::Medium));
        assert_eq!(RiskProfile::parse(" High "), Some(RiskProfile::High));
    }

    #[test]
    fn parse_rejects_unknown_tiers() {
        assert_eq!(RiskProfile::parse(""), None);
        assert_eq!(RiskProfile::parse("Extreme"), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for profile in RiskProfile::all() {
            assert_eq!(RiskProfile::parse(profile.as_str()), Some(*profile));
        }
    }
}
