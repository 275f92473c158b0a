// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lenient parsing of attribute values.
//!
//! Vendor firmware is inconsistent about number formatting (`"080"`,
//! `"12.5"` for an integer counter, padded strings). These helpers accept
//! what the vendor sends instead of failing on it.

/// Parses the leading integer of a string.
///
/// Surrounding whitespace and an optional sign are accepted; parsing stops at
/// the first non-digit, so `"12.5"` yields 12 and `"42px"` yields 42.
///
/// # Examples
///
/// ```
/// use vacbot_lib::fragment::value::parse_int;
///
/// assert_eq!(parse_int("12.5"), Some(12));
/// assert_eq!(parse_int(" -7 "), Some(-7));
/// assert_eq!(parse_int("080"), Some(80));
/// assert_eq!(parse_int("x1"), None);
/// ```
#[must_use]
pub fn parse_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses a float, tolerating surrounding whitespace.
#[must_use]
pub fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a presence/on-off flag (`1`/`0`, `true`/`false`).
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Returns `true` for a non-empty value other than `"false"`.
#[must_use]
pub fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "false"
}
