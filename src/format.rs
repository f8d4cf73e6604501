//! Display formatting helpers for reports.
//!
//! The masks strip everything but digits and then re-insert hyphens. Input
//! whose digit count does not fit a mask comes back unchanged.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").expect("valid regex"));

static RESIDENT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{6})(\d{7})$").expect("valid regex"));

static BUSINESS_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})(\d{2})(\d{5})$").expect("valid regex"));

static SEOUL_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(02)(\d{3,4})(\d{4})$").expect("valid regex"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0\d{2})(\d{3,4})(\d{4})$").expect("valid regex"));

fn digits_only(input: &str) -> String {
    NON_DIGIT.replace_all(input, "").into_owned()
}

fn apply_mask(input: &str, pattern: &Regex) -> String {
    let digits = digits_only(input);
    match pattern.captures(&digits) {
        Some(caps) => caps
            .iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("-"),
        None => input.to_string(),
    }
}

/// Formats an amount with thousands separators.
///
/// ```
/// use payroll_engine::format::format_number;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_number(Decimal::from(1_234_567)), "1,234,567");
/// assert_eq!(format_number(Decimal::new(-12345, 1)), "-1,234.5");
/// assert_eq!(format_number(Decimal::ZERO), "0");
/// ```
pub fn format_number(value: Decimal) -> String {
    let text = value.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Formats a resident registration number as `XXXXXX-XXXXXXX`.
///
/// ```
/// use payroll_engine::format::format_resident_number;
///
/// assert_eq!(format_resident_number("9001011234567"), "900101-1234567");
/// assert_eq!(format_resident_number("12345"), "12345");
/// ```
pub fn format_resident_number(input: &str) -> String {
    apply_mask(input, &RESIDENT_NUMBER)
}

/// Formats a business registration number as `XXX-XX-XXXXX`.
///
/// ```
/// use payroll_engine::format::format_business_number;
///
/// assert_eq!(format_business_number("1234567890"), "123-45-67890");
/// ```
pub fn format_business_number(input: &str) -> String {
    apply_mask(input, &BUSINESS_NUMBER)
}

/// Formats a phone number with hyphens.
///
/// Seoul numbers (`02`) split as 2-3-4 or 2-4-4; other numbers as 3-3-4 or
/// 3-4-4.
///
/// ```
/// use payroll_engine::format::format_phone_number;
///
/// assert_eq!(format_phone_number("01012345678"), "010-1234-5678");
/// assert_eq!(format_phone_number("021234567"), "02-123-4567");
/// assert_eq!(format_phone_number("0311234567"), "031-123-4567");
/// ```
pub fn format_phone_number(input: &str) -> String {
    let digits = digits_only(input);
    if digits.starts_with("02") {
        apply_mask(input, &SEOUL_PHONE)
    } else {
        apply_mask(input, &PHONE)
    }
}
