pub mod intake;

use chrono::{Datelike, Local};
use regex::Regex;
use thiserror::Error;

/// Display grouping for card numbers, 4 digits per block.
const GROUP: usize = 4;
/// Longest card number accepted, per ISO/IEC 7812.
const MAX_PAN_DIGITS: usize = 19;

/// Strip non-digits, cap at 19 digits and group in blocks of 4 for display.
#[must_use]
pub fn normalize_card_number(raw: &str) -> String {
    let mut out = String::with_capacity(MAX_PAN_DIGITS + MAX_PAN_DIGITS / GROUP);

    for (i, c) in raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_PAN_DIGITS)
        .enumerate()
    {
        if i > 0 && i % GROUP == 0 {
            out.push(' ');
        }
        out.push(c);
    }

    out
}

/// Strip non-digits, cap at 4 and insert the `/` of `MM/YY` once a third
/// digit exists.
#[must_use]
pub fn normalize_expiry(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).take(4).collect();

    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

/// Strip non-digits and cap at 4.
#[must_use]
pub fn normalize_cvv(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(4).collect()
}

/// Format check only: 13 to 19 digits once spacing is removed. No Luhn or
/// BIN-range verification, the server owns anything beyond shape.
#[must_use]
pub fn is_valid_card_number(s: &str) -> bool {
    let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    Regex::new(r"^\d{13,19}$").map_or(false, |re| re.is_match(&stripped))
}

/// `MM/YY` with a month of 01-12 and not already expired relative to the
/// local clock. A card expiring this month is still valid.
#[must_use]
pub fn is_valid_expiry(s: &str) -> bool {
    let now = Local::now();
    let year = u32::try_from(now.year().rem_euclid(100)).unwrap_or(0);

    is_valid_expiry_at(s, (year, now.month()))
}

/// Expiry check against an explicit `(two digit year, month)` pair.
#[must_use]
pub fn is_valid_expiry_at(s: &str, (current_year, current_month): (u32, u32)) -> bool {
    if !Regex::new(r"^(0[1-9]|1[0-2])/\d{2}$").map_or(false, |re| re.is_match(s)) {
        return false;
    }

    let Some((month, year)) = s.split_once('/') else {
        return false;
    };

    let Ok(month) = month.parse::<u32>() else {
        return false;
    };

    let Ok(year) = year.parse::<u32>() else {
        return false;
    };

    if year < current_year {
        return false;
    }

    if year == current_year && month < current_month {
        return false;
    }

    true
}

/// Exactly 3 or 4 digits.
#[must_use]
pub fn is_valid_cvv(s: &str) -> bool {
    Regex::new(r"^\d{3,4}$").map_or(false, |re| re.is_match(s))
}

/// Display form showing only the last four digits.
#[must_use]
pub fn mask_card_number(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    let keep = digits.len().saturating_sub(4);

    format!("**** **** **** {}", &digits[keep..])
}

/// First failing rule of a card submission; checks after it are not run.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CardInputError {
    #[error("Cardholder name is required")]
    MissingName,

    #[error("Invalid card number (13-19 digits)")]
    CardNumber,

    #[error("Invalid expiry date (MM/YY) or card expired")]
    Expiry,

    #[error("Invalid CVV (3-4 digits)")]
    Cvv,
}

/// A card record as entered, holding display-form strings. Never persisted,
/// the only consumer is [`intake::submit`].
#[derive(Clone, Debug)]
pub struct CardInput {
    pub cardholder_name: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl CardInput {
    /// Builds an input from raw user text, normalizing each field the way the
    /// form echoes keystrokes.
    #[must_use]
    pub fn from_raw(name: &str, number: &str, expiry: &str, cvv: &str) -> Self {
        Self {
            cardholder_name: name.trim().to_string(),
            card_number: normalize_card_number(number),
            expiry: normalize_expiry(expiry),
            cvv: normalize_cvv(cvv),
        }
    }

    /// The card number with display spacing removed, as transmitted.
    #[must_use]
    pub fn card_digits(&self) -> String {
        self.card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    /// Fail-fast validation, ordered name, number, expiry, cvv. Only the
    /// first failing rule is reported.
    pub fn validate(&self) -> Result<(), CardInputError> {
        let now = Local::now();
        let year = u32::try_from(now.year().rem_euclid(100)).unwrap_or(0);

        self.validate_at((year, now.month()))
    }

    /// Validation against an explicit clock, used by tests and by callers
    /// that already sampled the current month.
    pub fn validate_at(&self, current: (u32, u32)) -> Result<(), CardInputError> {
        if self.cardholder_name.trim().is_empty() {
            return Err(CardInputError::MissingName);
        }

        if !is_valid_card_number(&self.card_number) {
            return Err(CardInputError::CardNumber);
        }

        if !is_valid_expiry_at(&self.expiry, current) {
            return Err(CardInputError::Expiry);
        }

        if !is_valid_cvv(&self.cvv) {
            return Err(CardInputError::Cvv);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_card_number_groups_by_four() {
        assert_eq!(
            normalize_card_number("4111111111111111"),
            "4111 1111 1111 1111"
        );
        assert_eq!(normalize_card_number("4111-1111 11"), "4111 1111 11");
        assert_eq!(normalize_card_number("abc"), "");
    }

    #[test]
    fn test_normalize_card_number_caps_at_nineteen_digits() {
        let normalized = normalize_card_number("123456789012345678901234");
        let digits: String = normalized.chars().filter(char::is_ascii_digit).collect();

        assert_eq!(digits.len(), 19);
        assert_eq!(normalized, "1234 5678 9012 3456 789");
    }

    #[test]
    fn test_normalized_output_is_digits_and_block_spaces_only() {
        for raw in ["41x1 1111", "  4111111111111111  ", "4-1-1-1", "💳 4111"] {
            let normalized = normalize_card_number(raw);

            assert!(normalized.chars().all(|c| c.is_ascii_digit() || c == ' '));

            for (i, c) in normalized.chars().enumerate() {
                if c == ' ' {
                    // a space only ever follows a full block of 4
                    assert_eq!(i % (GROUP + 1), GROUP);
                }
            }
        }
    }

    #[test]
    fn test_normalize_expiry_inserts_separator() {
        assert_eq!(normalize_expiry("1"), "1");
        assert_eq!(normalize_expiry("12"), "12");
        assert_eq!(normalize_expiry("129"), "12/9");
        assert_eq!(normalize_expiry("1299"), "12/99");
        assert_eq!(normalize_expiry("12/99"), "12/99");
        assert_eq!(normalize_expiry("12998"), "12/99");
    }

    #[test]
    fn test_normalize_cvv_strips_and_caps() {
        assert_eq!(normalize_cvv("12a34"), "1234");
        assert_eq!(normalize_cvv("123456"), "1234");
        assert_eq!(normalize_cvv(""), "");
    }

    #[test]
    fn test_card_number_format_bounds() {
        assert!(!is_valid_card_number("123456789012"));
        assert!(is_valid_card_number("1234567890123"));
        assert!(is_valid_card_number("4111 1111 1111 1111"));
        assert!(is_valid_card_number("1234567890123456789"));
        assert!(!is_valid_card_number("12345678901234567890"));
        assert!(!is_valid_card_number("4111a11111111111"));
        assert!(!is_valid_card_number(""));
    }

    #[test]
    fn test_expiry_month_range() {
        assert!(!is_valid_expiry_at("00/99", (25, 1)));
        assert!(!is_valid_expiry_at("13/99", (25, 1)));
        assert!(is_valid_expiry_at("01/99", (25, 1)));
        assert!(is_valid_expiry_at("12/99", (25, 1)));
        assert!(!is_valid_expiry_at("1/99", (25, 1)));
        assert!(!is_valid_expiry_at("12-99", (25, 1)));
        assert!(!is_valid_expiry_at("12/9", (25, 1)));
    }

    #[test]
    fn test_expiry_not_before_current_month() {
        // strictly earlier year
        assert!(!is_valid_expiry_at("12/24", (25, 6)));
        // same year, earlier month
        assert!(!is_valid_expiry_at("05/25", (25, 6)));
        // same year and month is still valid, the card expires end of month
        assert!(is_valid_expiry_at("06/25", (25, 6)));
        // later month or year
        assert!(is_valid_expiry_at("07/25", (25, 6)));
        assert!(is_valid_expiry_at("01/26", (25, 6)));
    }

    #[test]
    fn test_cvv_length() {
        assert!(!is_valid_cvv("12"));
        assert!(is_valid_cvv("123"));
        assert!(is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12345"));
        assert!(!is_valid_cvv("12b"));
    }

    #[test]
    fn test_mask_card_number() {
        assert_eq!(
            mask_card_number("4111111111111111"),
            "**** **** **** 1111"
        );
        assert_eq!(
            mask_card_number("4111 1111 1111 1234"),
            "**** **** **** 1234"
        );
        assert_eq!(mask_card_number(""), "");
    }

    #[test]
    fn test_validate_fail_fast_order() {
        let input = CardInput::from_raw("", "bad", "bad", "bad");
        assert_eq!(input.validate_at((25, 6)), Err(CardInputError::MissingName));

        let input = CardInput::from_raw("Ada Lovelace", "1234", "bad", "bad");
        assert_eq!(input.validate_at((25, 6)), Err(CardInputError::CardNumber));

        let input = CardInput::from_raw("Ada Lovelace", "4111111111111111", "0124", "bad");
        assert_eq!(input.validate_at((25, 6)), Err(CardInputError::Expiry));

        let input = CardInput::from_raw("Ada Lovelace", "4111111111111111", "1299", "12");
        assert_eq!(input.validate_at((25, 6)), Err(CardInputError::Cvv));

        let input = CardInput::from_raw("Ada Lovelace", "4111 1111 1111 1111", "12/99", "123");
        assert_eq!(input.validate_at((25, 6)), Ok(()));
    }

    #[test]
    fn test_whitespace_only_name_is_missing() {
        let input = CardInput::from_raw("   ", "4111111111111111", "12/99", "123");
        assert_eq!(input.validate_at((25, 6)), Err(CardInputError::MissingName));
    }

    #[test]
    fn test_card_digits_strips_display_spacing() {
        let input = CardInput::from_raw("Ada", "4111 1111 1111 1111", "12/99", "123");
        assert_eq!(input.card_digits(), "4111111111111111");
    }
}
