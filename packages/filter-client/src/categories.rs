//! Static category tables.
//!
//! Each provider files domains under numeric category codes. A domain counts
//! as unblocked when its code is in that provider's permitted set below.
//! Lightspeed only returns codes, so its human-readable names come from a
//! separate code-to-name table ([`CategoryNames`]).

use std::collections::HashMap;

use crate::error::{FilterError, Result};
use crate::types::Provider;

/// Lightspeed category codes that are let through.
pub const LIGHTSPEED_UNBLOCKED: &[i64] = &[
    6, 9, 10, 14, 15, 18, 20, 29, 30, 36, 37, 40, 41, 43, 44, 45, 46, 47, 48, 49, 50, 51, 57, 58,
    59, 69, 73, 75, 76, 77, 79, 83, 84, 85, 99, 129, 131, 132, 139, 140, 900,
];

/// FortiGuard rating codes that are let through.
pub const FORTIGUARD_UNBLOCKED: &[i64] = &[
    0, 9, 28, 29, 30, 31, 33, 34, 35, 36, 39, 40, 41, 42, 43, 44, 46, 47, 49, 50, 51, 52, 53, 63,
    75, 76, 77, 78, 79, 80, 81, 82, 84, 92,
];

impl Provider {
    /// Permitted category codes for this provider.
    pub fn unblocked_codes(&self) -> &'static [i64] {
        match self {
            Provider::Lightspeed => LIGHTSPEED_UNBLOCKED,
            Provider::FortiGuard => FORTIGUARD_UNBLOCKED,
        }
    }

    pub fn is_unblocked(&self, code: i64) -> bool {
        self.unblocked_codes().contains(&code)
    }
}

/// Lightspeed code-to-name table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct CategoryNames {
    names: HashMap<i64, String>,
}

impl CategoryNames {
    pub fn new(names: HashMap<i64, String>) -> Self {
        Self { names }
    }

    /// Parse the provider's JSON object of `"code": "name"` pairs.
    ///
    /// Keys that are not integers are skipped; they can never match a code.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut names = HashMap::with_capacity(raw.len());
        for (code, name) in raw {
            match code.trim().parse::<i64>() {
                Ok(code) => {
                    names.insert(code, name);
                }
                Err(_) => {
                    tracing::debug!(key = %code, "Skipping non-numeric category key");
                }
            }
        }
        if names.is_empty() {
            return Err(FilterError::Config(
                "category table contains no numeric codes".to_string(),
            ));
        }
        Ok(Self { names })
    }

    /// Name for a code. Empty names count as missing.
    pub fn get(&self, code: i64) -> Option<&str> {
        self.names
            .get(&code)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// First code, in order, that has a name.
    pub fn first_named<'a>(&'a self, codes: &[Option<i64>]) -> Option<&'a str> {
        codes.iter().flatten().find_map(|code| self.get(*code))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_code_is_unblocked() {
        for provider in Provider::ALL {
            for code in provider.unblocked_codes() {
                assert!(provider.is_unblocked(*code), "{} {}", provider, code);
            }
        }
    }

    #[test]
    fn unlisted_codes_are_blocked() {
        for code in [1, 2, 5, 200] {
            assert!(!Provider::Lightspeed.is_unblocked(code));
        }
        for code in [1, 26, 61, 1000] {
            assert!(!Provider::FortiGuard.is_unblocked(code));
        }
    }

    #[test]
    fn tables_differ_per_provider() {
        // 0 is a FortiGuard "unrated" code but not a Lightspeed permitted one
        assert!(Provider::FortiGuard.is_unblocked(0));
        assert!(!Provider::Lightspeed.is_unblocked(0));
        assert!(Provider::Lightspeed.is_unblocked(900));
        assert!(!Provider::FortiGuard.is_unblocked(900));
    }

    #[test]
    fn names_parse_from_json_object() {
        let names = CategoryNames::from_json(r#"{"9": "education", "x": "bogus", "10": ""}"#)
            .unwrap();

        assert_eq!(names.len(), 2);
        assert_eq!(names.get(9), Some("education"));
        assert_eq!(names.get(10), None);
        assert_eq!(names.get(11), None);
    }

    #[test]
    fn first_named_follows_slot_order() {
        let names = CategoryNames::from_json(r#"{"5": "games", "9": "education"}"#).unwrap();

        assert_eq!(names.first_named(&[Some(9), Some(5)]), Some("education"));
        assert_eq!(names.first_named(&[None, Some(5)]), Some("games"));
        assert_eq!(names.first_named(&[Some(200), Some(5)]), Some("games"));
        assert_eq!(names.first_named(&[Some(200), None]), None);
    }

    #[test]
    fn names_without_numeric_keys_are_rejected() {
        assert!(matches!(
            CategoryNames::from_json(r#"{"a": "b"}"#),
            Err(FilterError::Config(_))
        ));
        assert!(matches!(
            CategoryNames::from_json("[1, 2]"),
            Err(FilterError::Json(_))
        ));
    }
}
