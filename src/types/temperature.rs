// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature parsing and unit conversion.
//!
//! The vendor reports temperatures in Fahrenheit, sometimes as JSON numbers
//! and sometimes as strings. Since late 2023 some strings use a comma as the
//! decimal separator (`"99,5"`), so every numeric field goes through
//! [`parse_decimal`] before any arithmetic.

use serde_json::Value;

/// Offset the vendor mobile client adds to a requested set point.
///
/// Writes carry `requested + 0.4` while reads report the plain set point.
pub const SET_POINT_OFFSET_F: f64 = 0.4;

/// Parses a decimal string accepting either `.` or `,` as separator.
///
/// Returns `None` for empty or non-numeric input.
///
/// # Examples
///
/// ```
/// use cmspa_lib::types::parse_decimal;
///
/// assert_eq!(parse_decimal("21,5"), Some(21.5));
/// assert_eq!(parse_decimal("21.5"), Some(21.5));
/// assert_eq!(parse_decimal("n/a"), None);
/// ```
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a JSON value that should hold a number, tolerating string encodings.
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_decimal(s),
        _ => None,
    }
}

/// Converts Fahrenheit to Celsius.
#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Converts Celsius to Fahrenheit.
#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Compares two vendor temperatures, absorbing float noise from the offset.
#[must_use]
pub fn same_temperature(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comma_and_dot_agree() {
        for (comma, dot) in [("21,5", "21.5"), ("104,0", "104.0"), ("99", "99")] {
            assert_eq!(parse_decimal(comma), parse_decimal(dot));
        }
        assert_eq!(parse_decimal("21,5"), Some(21.5));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("hot"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn json_number_or_string() {
        assert_eq!(decimal_from_json(&json!(100.5)), Some(100.5));
        assert_eq!(decimal_from_json(&json!("100,5")), Some(100.5));
        assert_eq!(decimal_from_json(&json!(null)), None);
        assert_eq!(decimal_from_json(&json!(true)), None);
    }

    #[test]
    fn unit_conversion() {
        assert!(same_temperature(fahrenheit_to_celsius(212.0), 100.0));
        assert!(same_temperature(fahrenheit_to_celsius(32.0), 0.0));
        assert!(same_temperature(celsius_to_fahrenheit(37.0), 98.6));
        assert!(same_temperature(
            fahrenheit_to_celsius(celsius_to_fahrenheit(38.5)),
            38.5
        ));
    }

    #[test]
    fn offset_comparison_tolerates_float_noise() {
        assert!(same_temperature(100.0 + SET_POINT_OFFSET_F, 100.4));
        assert!(!same_temperature(100.0, 100.4));
    }
}
