//! Legacy full-name splitting

use crate::constants::{NAME_SEPARATOR, UNKNOWN_FIRST_NAME};
use crate::models::PersonName;

/// Split a "LAST, FIRST" name into its components
///
/// Only the first comma separates the parts, so "SMITH, JOHN, JR" yields a
/// first name of "JOHN, JR". A name without any comma is kept whole as the
/// last name and paired with the sentinel first name "Unknown".
pub fn split_full_name(full_name: &str) -> PersonName {
    match full_name.split_once(NAME_SEPARATOR) {
        Some((last, first)) => PersonName {
            first_name: first.trim().to_string(),
            last_name: last.trim().to_string(),
        },
        None => PersonName {
            first_name: UNKNOWN_FIRST_NAME.to_string(),
            last_name: full_name.to_string(),
        },
    }
}

/// Whether `split_full_name` will fall back to the sentinel for this input
pub fn is_sentinel_name(full_name: &str) -> bool {
    !full_name.contains(NAME_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_last_first() {
        let name = split_full_name("SMITH, JOHN");
        assert_eq!(name.first_name, "JOHN");
        assert_eq!(name.last_name, "SMITH");
    }

    #[test]
    fn test_split_trims_whitespace() {
        let name = split_full_name("  O'BRIEN ,   MARY ANN  ");
        assert_eq!(name.first_name, "MARY ANN");
        assert_eq!(name.last_name, "O'BRIEN");
    }

    #[test]
    fn test_split_without_space_after_comma() {
        let name = split_full_name("DOE,JANE");
        assert_eq!(name.first_name, "JANE");
        assert_eq!(name.last_name, "DOE");
    }

    #[test]
    fn test_only_first_comma_splits() {
        let name = split_full_name("SMITH, JOHN, JR");
        assert_eq!(name.first_name, "JOHN, JR");
        assert_eq!(name.last_name, "SMITH");
    }

    #[test]
    fn test_no_comma_yields_sentinel_and_unchanged_input() {
        let name = split_full_name(" Prince ");
        assert_eq!(name.first_name, "Unknown");
        assert_eq!(name.last_name, " Prince ");
        assert!(is_sentinel_name(" Prince "));
    }

    #[test]
    fn test_empty_input_is_sentinel() {
        let name = split_full_name("");
        assert_eq!(name.first_name, "Unknown");
        assert_eq!(name.last_name, "");
    }

    #[test]
    fn test_dangling_comma_gives_empty_first_name() {
        let name = split_full_name("SMITH,");
        assert_eq!(name.first_name, "");
        assert_eq!(name.last_name, "SMITH");
        assert!(!is_sentinel_name("SMITH,"));
    }
}
