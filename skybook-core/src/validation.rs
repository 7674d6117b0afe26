//! Field sanitizers and checkers used as input masks by the booking forms.
//!
//! Every function here is total: bad input yields an empty string or `false`,
//! never an error. Sanitizers are idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

pub const PHONE_DIGITS: usize = 10;
pub const CARD_NUMBER_DIGITS: usize = 16;
pub const CVV_DIGITS: usize = 3;
pub const MAX_AGE: i64 = 100;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static SEAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([1-9][0-9]?)[A-K]$").expect("seat pattern is valid"));

/// Drops everything that is not a letter or whitespace.
pub fn sanitize_alphabetic(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect()
}

pub fn sanitize_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn sanitize_phone(input: &str) -> String {
    truncate_digits(input, PHONE_DIGITS)
}

pub fn is_valid_email(input: &str) -> bool {
    EMAIL_RE.is_match(input)
}

/// Valid iff the string parses as an integer in `0..=100`.
pub fn is_valid_age(input: &str) -> bool {
    match input.trim().parse::<i64>() {
        Ok(age) => (0..=MAX_AGE).contains(&age),
        Err(_) => false,
    }
}

pub fn is_valid_phone(input: &str) -> bool {
    input.len() == PHONE_DIGITS && input.chars().all(|c| c.is_ascii_digit())
}

// Card masks

pub fn sanitize_card_number(input: &str) -> String {
    truncate_digits(input, CARD_NUMBER_DIGITS)
}

pub fn sanitize_cvv(input: &str) -> String {
    truncate_digits(input, CVV_DIGITS)
}

/// Formats raw keystrokes as `MM/YY`, inserting the separator once two digits are present.
pub fn format_expiry(input: &str) -> String {
    let digits = truncate_digits(input, 4);
    if digits.len() > 2 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

pub fn is_airport_code(input: &str) -> bool {
    input.len() == 3 && input.chars().all(|c| c.is_ascii_uppercase())
}

pub fn is_valid_seat_label(input: &str) -> bool {
    SEAT_RE.is_match(input)
}

fn truncate_digits(input: &str, max: usize) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_alphabetic_keeps_letters_and_spaces() {
        assert_eq!(sanitize_alphabetic("Mary-Jane 2nd"), "MaryJane nd");
        assert_eq!(sanitize_alphabetic("José"), "José");
        assert_eq!(sanitize_alphabetic("1234"), "");
    }

    #[test]
    fn test_sanitize_phone_truncates() {
        assert_eq!(sanitize_phone("+91 98765-43210"), "9198765432");
        assert_eq!(sanitize_phone("98765"), "98765");
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("asha@example.co.in"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("asha example@mail.com"));
        assert!(!is_valid_email("@mail.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_age_range() {
        assert!(is_valid_age("0"));
        assert!(is_valid_age("100"));
        assert!(!is_valid_age("101"));
        assert!(!is_valid_age("-1"));
        assert!(!is_valid_age("abc"));
        assert!(!is_valid_age(""));
    }

    #[test]
    fn test_card_number_mask() {
        assert_eq!(sanitize_card_number("12ab-34!!56"), "123456");
        assert_eq!(sanitize_card_number("4111 1111 1111 1111 999"), "4111111111111111");
    }

    #[test]
    fn test_expiry_inserts_separator() {
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("12"), "12");
        assert_eq!(format_expiry("122"), "12/2");
        assert_eq!(format_expiry("12/27"), "12/27");
        assert_eq!(format_expiry("122799"), "12/27");
    }

    #[test]
    fn test_cvv_mask() {
        assert_eq!(sanitize_cvv("12a34"), "123");
    }

    #[test]
    fn test_seat_labels() {
        assert!(is_valid_seat_label("12C"));
        assert!(is_valid_seat_label("1A"));
        assert!(!is_valid_seat_label("0A"));
        assert!(!is_valid_seat_label("12Z"));
        assert!(!is_valid_seat_label("100A"));
    }

    proptest! {
        #[test]
        fn prop_sanitizers_are_idempotent(s in ".*") {
            let alpha = sanitize_alphabetic(&s);
            prop_assert_eq!(sanitize_alphabetic(&alpha), alpha.clone());
            let digits = sanitize_digits(&s);
            prop_assert_eq!(sanitize_digits(&digits), digits.clone());
            let phone = sanitize_phone(&s);
            prop_assert!(phone.len() <= PHONE_DIGITS);
            prop_assert_eq!(sanitize_phone(&phone), phone.clone());
            let expiry = format_expiry(&s);
            prop_assert_eq!(format_expiry(&expiry), expiry.clone());
        }

        #[test]
        fn prop_card_number_is_digit_prefix(s in ".*") {
            let masked = sanitize_card_number(&s);
            prop_assert!(masked.len() <= CARD_NUMBER_DIGITS);
            prop_assert!(sanitize_digits(&s).starts_with(&masked));
        }

        #[test]
        fn prop_every_age_in_range_is_valid(age in 0i64..=100) {
            prop_assert!(is_valid_age(&age.to_string()));
        }
    }
}
