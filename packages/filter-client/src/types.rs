use std::fmt;

use serde::{Deserialize, Serialize};

/// The categorization services a domain can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Lightspeed,
    #[serde(rename = "fortiguard")]
    FortiGuard,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Lightspeed, Provider::FortiGuard];

    /// Wire / CLI name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Lightspeed => "lightspeed",
            Provider::FortiGuard => "fortiguard",
        }
    }

    /// Name as shown to people.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Lightspeed => "Lightspeed",
            Provider::FortiGuard => "FortiGuard",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lightspeed" => Ok(Provider::Lightspeed),
            "fortiguard" => Ok(Provider::FortiGuard),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Verdict for one domain from one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterStatus {
    Unblocked,
    Blocked,
    /// The service answered, but not with a usable classification
    Unknown,
    /// The service could not be asked, or its answer could not be read
    Error,
}

impl FilterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterStatus::Unblocked => "Unblocked",
            FilterStatus::Blocked => "Blocked",
            FilterStatus::Unknown => "Unknown",
            FilterStatus::Error => "Error",
        }
    }

    pub fn from_permitted(permitted: bool) -> Self {
        if permitted {
            FilterStatus::Unblocked
        } else {
            FilterStatus::Blocked
        }
    }
}

impl fmt::Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized result of one provider lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub status: FilterStatus,
    pub category: String,
}

impl ProviderResult {
    pub fn new(status: FilterStatus, category: impl Into<String>) -> Self {
        Self {
            status,
            category: category.into(),
        }
    }

    /// Soft failure: `{Unknown, Unknown}`.
    pub fn unknown() -> Self {
        Self::new(FilterStatus::Unknown, "Unknown")
    }

    /// Hard failure: `{Error, Error}`.
    pub fn error() -> Self {
        Self::new(FilterStatus::Error, "Error")
    }

    pub fn is_unblocked(&self) -> bool {
        self.status == FilterStatus::Unblocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Provider::FortiGuard).unwrap(),
            "\"fortiguard\""
        );
        assert_eq!(
            serde_json::to_string(&Provider::Lightspeed).unwrap(),
            "\"lightspeed\""
        );
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("FortiGuard".parse::<Provider>(), Ok(Provider::FortiGuard));
        assert_eq!("lightspeed".parse::<Provider>(), Ok(Provider::Lightspeed));
        assert!("websense".parse::<Provider>().is_err());
    }

    #[test]
    fn result_serializes_with_capitalized_status() {
        let json = serde_json::to_value(ProviderResult::unknown()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "Unknown", "category": "Unknown"})
        );
    }
}
