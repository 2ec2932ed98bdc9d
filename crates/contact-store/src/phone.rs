//! Phone number normalization to E.164-like international form.

use crate::error::StoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Accepted canonical form: `+` followed by 6 to 15 ASCII digits.
static CANONICAL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[0-9]{6,15}$").expect("canonical phone pattern is valid"));

/// A bare international prefix and the country it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryPrefix {
    /// Digits of the calling code without `+` (e.g., "254")
    pub prefix: String,
    /// Country label (e.g., "KE")
    pub country: String,
}

impl CountryPrefix {
    pub fn new(prefix: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            country: country.into(),
        }
    }
}

/// Rules for turning free-form input into a canonical phone number.
#[derive(Debug, Clone)]
pub struct PhoneNormalizer {
    /// Default calling code, stored with its leading `+`
    default_country_code: String,
    /// Known bare prefixes, longest first
    prefixes: Vec<CountryPrefix>,
    /// Inclusive digit-count range treated as a local subscriber number
    local_len: (usize, usize),
}

impl Default for PhoneNormalizer {
    fn default() -> Self {
        Self::new("+254", default_prefixes(), (9, 9))
    }
}

/// East African calling codes recognised without a leading `+`.
pub fn default_prefixes() -> Vec<CountryPrefix> {
    vec![
        CountryPrefix::new("254", "KE"),
        CountryPrefix::new("255", "TZ"),
        CountryPrefix::new("256", "UG"),
        CountryPrefix::new("250", "RW"),
        CountryPrefix::new("257", "BI"),
        CountryPrefix::new("260", "ZM"),
    ]
}

/// Parse a `"254=KE,255=TZ"` style prefix table.
///
/// Entries without a country label (`"254"`) are accepted.
pub fn parse_prefix_table(table: &str) -> Result<Vec<CountryPrefix>, StoreError> {
    table
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (prefix, country) = match entry.split_once('=') {
                Some((p, c)) => (p.trim(), c.trim()),
                None => (entry, ""),
            };
            let prefix = prefix.trim_start_matches('+');
            if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err(StoreError::InvalidInput(format!(
                    "Invalid country prefix '{}'",
                    entry
                )));
            }
            Ok(CountryPrefix::new(prefix, country))
        })
        .collect()
}

impl PhoneNormalizer {
    /// Create a normalizer.
    ///
    /// `default_country_code` may be given with or without its leading `+`.
    pub fn new(
        default_country_code: &str,
        mut prefixes: Vec<CountryPrefix>,
        local_len: (usize, usize),
    ) -> Self {
        let digits = default_country_code.trim().trim_start_matches('+');
        prefixes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Self {
            default_country_code: format!("+{}", digits),
            prefixes,
            local_len: (local_len.0.min(local_len.1), local_len.0.max(local_len.1)),
        }
    }

    pub fn default_country_code(&self) -> &str {
        &self.default_country_code
    }

    pub fn prefixes(&self) -> &[CountryPrefix] {
        &self.prefixes
    }

    /// Country label for a canonical number, if its calling code is known.
    pub fn country_of(&self, phone: &str) -> Option<&str> {
        let digits = phone.strip_prefix('+')?;
        self.prefixes
            .iter()
            .find(|p| digits.starts_with(&p.prefix))
            .map(|p| p.country.as_str())
    }

    /// Normalize a free-form phone number.
    ///
    /// Rules apply in order; the first that matches wins, and the result must
    /// look like `+` followed by 6 to 15 digits.
    pub fn normalize(&self, raw: &str) -> Result<String, StoreError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
            .collect();

        let candidate = if cleaned.starts_with('+') {
            cleaned
        } else if cleaned.starts_with('0') {
            format!(
                "{}{}",
                self.default_country_code,
                cleaned.trim_start_matches('0')
            )
        } else if is_digits(&cleaned) && self.has_known_prefix(&cleaned) {
            format!("+{}", cleaned)
        } else if is_digits(&cleaned) && self.is_local_length(&cleaned) {
            format!("{}{}", self.default_country_code, cleaned)
        } else {
            cleaned
        };

        if CANONICAL_PHONE.is_match(&candidate) {
            Ok(candidate)
        } else {
            Err(StoreError::InvalidPhone(raw.trim().to_string()))
        }
    }

    fn has_known_prefix(&self, digits: &str) -> bool {
        self.prefixes.iter().any(|p| digits.starts_with(&p.prefix))
    }

    fn is_local_length(&self, digits: &str) -> bool {
        (self.local_len.0..=self.local_len.1).contains(&digits.len())
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_number_with_leading_zero() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("0712345678").unwrap(), "+254712345678");
        assert_eq!(n.normalize("0712 345 678").unwrap(), "+254712345678");
        assert_eq!(n.normalize("00712345678").unwrap(), "+254712345678");
    }

    #[test]
    fn test_plus_prefixed_number_kept() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("+1 555-123-4567").unwrap(), "+15551234567");
        assert_eq!(n.normalize("+1 (415) 555-1234").unwrap(), "+14155551234");
        assert_eq!(n.normalize("+254712345678").unwrap(), "+254712345678");
    }

    #[test]
    fn test_bare_country_prefix() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("254712345678").unwrap(), "+254712345678");
        assert_eq!(n.normalize("255 712 345 678").unwrap(), "+255712345678");
        assert_eq!(n.normalize("260971234567").unwrap(), "+260971234567");
    }

    #[test]
    fn test_local_subscriber_number() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("712345678").unwrap(), "+254712345678");
    }

    #[test]
    fn test_invalid_numbers() {
        let n = PhoneNormalizer::default();
        assert!(matches!(n.normalize("abc"), Err(StoreError::InvalidPhone(_))));
        assert!(n.normalize("").is_err());
        assert!(n.normalize("12345").is_err());
        assert!(n.normalize("+12345").is_err());
        assert!(n.normalize("+1234567890123456").is_err());
        assert!(n.normalize("+2547one2345678").is_err());
        assert!(n.normalize("0").is_err());
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        let n = PhoneNormalizer::default();
        assert!(matches!(n.normalize("+١٢٣٤٥٦٧"), Err(StoreError::InvalidPhone(_))));
        assert!(n.normalize("+２５４７１２３４５６７８").is_err());
        assert!(n.normalize("٠٧١٢٣٤٥٦٧٨").is_err());
    }

    #[test]
    fn test_only_whitespace_hyphens_and_parentheses_stripped() {
        let n = PhoneNormalizer::default();
        assert!(matches!(n.normalize("0712.345.678"), Err(StoreError::InvalidPhone(_))));
        assert!(n.normalize("+1.555.123.4567").is_err());
        assert!(n.normalize("0712/345/678").is_err());
        assert_eq!(n.normalize("\t(0712) 345-678 ").unwrap(), "+254712345678");
    }

    #[test]
    fn test_unknown_bare_number_rejected() {
        // Not a known prefix and not a local length.
        let n = PhoneNormalizer::default();
        assert!(n.normalize("15551234567").is_err());
    }

    #[test]
    fn test_plus_takes_precedence_over_zero_rule() {
        let n = PhoneNormalizer::default();
        assert_eq!(n.normalize("+0712345678").unwrap(), "+0712345678");
    }

    #[test]
    fn test_custom_default_country() {
        let n = PhoneNormalizer::new("44", vec![CountryPrefix::new("44", "GB")], (10, 10));
        assert_eq!(n.default_country_code(), "+44");
        assert_eq!(n.normalize("07911123456").unwrap(), "+447911123456");
        assert_eq!(n.normalize("447911123456").unwrap(), "+447911123456");
        assert_eq!(n.normalize("7911123456").unwrap(), "+447911123456");
    }

    #[test]
    fn test_country_lookup_prefers_longest_prefix() {
        let n = PhoneNormalizer::new(
            "+1",
            vec![CountryPrefix::new("1", "US"), CountryPrefix::new("1876", "JM")],
            (10, 10),
        );
        assert_eq!(n.country_of("+18765551234"), Some("JM"));
        assert_eq!(n.country_of("+14155551234"), Some("US"));
        assert_eq!(n.country_of("+447911123456"), None);
    }

    #[test]
    fn test_parse_prefix_table() {
        let table = parse_prefix_table("254=KE, 255=TZ,+256=UG,250").unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0], CountryPrefix::new("254", "KE"));
        assert_eq!(table[2], CountryPrefix::new("256", "UG"));
        assert_eq!(table[3], CountryPrefix::new("250", ""));

        assert!(parse_prefix_table("").unwrap().is_empty());
        assert!(parse_prefix_table("KE=254").is_err());
    }
}
