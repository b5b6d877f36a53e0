//! Shared helpers for monetary presentation.
//!
//! The pricing pipeline never rounds; these helpers are applied only where a
//! value leaves the engine for display or export.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(2291.666666)), dec!(2291.67));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders an amount in Rand: `R` prefix, two decimals, `,` thousands
/// separators. Negative amounts render as `-R1,234.00`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rent_core::calculations::common::format_rand;
///
/// assert_eq!(format_rand(dec!(110000)), "R110,000.00");
/// assert_eq!(format_rand(dec!(-2500.5)), "-R2,500.50");
/// ```
pub fn format_rand(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let plain = format!("{:.2}", rounded.abs());
    let (whole, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}R{grouped}.{fraction}")
}
