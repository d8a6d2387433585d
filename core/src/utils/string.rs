//! String utility functions
//!
//! This module provides the string manipulation used by schema inference,
//! numeric normalization and error reporting.

use unicode_normalization::UnicodeNormalization;

/// String utility functions
#[derive(Debug)]
pub struct StringUtils;

impl StringUtils {
    /// Truncate a string to a maximum number of characters with ellipsis
    pub fn truncate(s: &str, max_length: usize) -> String {
        match s.char_indices().nth(max_length) {
            None => s.to_string(),
            Some((end, _)) => {
                let mut result = s[..end].to_string();
                result.push_str("...");
                result
            }
        }
    }

    /// Remove all whitespace from a string
    pub fn remove_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Strip diacritics by decomposing and dropping combining marks
    pub fn strip_diacritics(s: &str) -> String {
        s.nfd().filter(|c| !('\u{0300}'..='\u{036f}').contains(c)).collect()
    }

    /// Turn a free-form column label into a SQL identifier.
    ///
    /// Diacritics are stripped, the result is lower-cased and every character
    /// outside `[A-Za-z0-9_]` becomes `_`. An empty result falls back to
    /// `column_<index>`.
    pub fn normalize_identifier(label: &str, index: usize) -> String {
        let normalized: String = Self::strip_diacritics(label)
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();

        if normalized.is_empty() {
            format!("column_{}", index)
        } else {
            normalized
        }
    }

    /// Check if a string is a valid identifier
    pub fn is_valid_identifier(s: &str) -> bool {
        if s.is_empty() {
            return false;
        }

        let mut chars = s.chars();

        // First character must be a letter, digit or underscore; quoted identifiers may start with a digit
        match chars.next() {
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
            _ => return false,
        }

        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Format a duration in milliseconds to a human-readable string
    pub fn format_duration(millis: u64) -> String {
        if millis < 1000 {
            return format!("{}ms", millis);
        }

        let seconds = millis / 1000;
        if seconds < 60 {
            return format!("{}.{:03}s", seconds, millis % 1000);
        }

        let minutes = seconds / 60;
        format!("{}m {}s", minutes, seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truncate() {
        assert_eq!(StringUtils::truncate("Hello", 10), "Hello");
        assert_eq!(StringUtils::truncate("Hello, world!", 5), "Hello...");
        assert_eq!(StringUtils::truncate("", 5), "");
        assert_eq!(StringUtils::truncate("Žluťoučký", 3), "Žlu...");
    }

    #[test]
    fn test_remove_whitespace() {
        assert_eq!(StringUtils::remove_whitespace("1 234,50"), "1234,50");
        assert_eq!(StringUtils::remove_whitespace(" a\tb c \n"), "abc");
        assert_eq!(StringUtils::remove_whitespace(""), "");
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(StringUtils::normalize_identifier("First Name", 0), "first_name");
        assert_eq!(StringUtils::normalize_identifier("Příjmení", 1), "prijmeni");
        assert_eq!(StringUtils::normalize_identifier("price ($)", 2), "price____");
        assert_eq!(StringUtils::normalize_identifier("already_ok", 3), "already_ok");
        assert_eq!(StringUtils::normalize_identifier("", 4), "column_4");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(StringUtils::is_valid_identifier("valid_identifier"));
        assert!(StringUtils::is_valid_identifier("_valid"));
        assert!(StringUtils::is_valid_identifier("123"));
        assert!(!StringUtils::is_valid_identifier("invalid-identifier"));
        assert!(!StringUtils::is_valid_identifier("čeština"));
        assert!(!StringUtils::is_valid_identifier(""));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(StringUtils::format_duration(500), "500ms");
        assert_eq!(StringUtils::format_duration(1500), "1.500s");
        assert_eq!(StringUtils::format_duration(65000), "1m 5s");
    }

    proptest! {
        #[test]
        fn normalized_identifiers_are_always_valid(label in ".*", index in 0usize..1000) {
            let name = StringUtils::normalize_identifier(&label, index);
            prop_assert!(StringUtils::is_valid_identifier(&name));
        }
    }
}
