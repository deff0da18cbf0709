//! Brazilian number parsing and formatting
//!
//! Rates arrive from the Banco Central as `"13,25"` and users type amounts
//! either way (`10000.50` or `10.000,50`), so parsing accepts both notations.
//! Display always uses the pt-BR convention: `.` for thousands, `,` for decimals.

use anyhow::{anyhow, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a decimal written in either Brazilian or plain notation.
///
/// When a comma is present it is the decimal separator and any `.` is a
/// thousands separator. Without a comma the input is parsed as-is.
/// A leading `R$` and a trailing `%` are ignored.
///
/// # Examples
/// ```
/// use rendafixa::utils::parse_decimal_br;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_decimal_br("13,25").unwrap(), dec!(13.25));
/// assert_eq!(parse_decimal_br("10.000,50").unwrap(), dec!(10000.50));
/// assert_eq!(parse_decimal_br("10000.50").unwrap(), dec!(10000.50));
/// ```
pub fn parse_decimal_br(input: &str) -> Result<Decimal> {
    let stripped = input
        .trim()
        .trim_start_matches("R$")
        .trim_end_matches('%')
        .trim();
    if stripped.is_empty() {
        return Err(anyhow!("Empty decimal input"));
    }

    let normalized = if stripped.contains(',') {
        stripped.replace('.', "").replace(',', ".")
    } else {
        stripped.to_string()
    };

    Decimal::from_str(&normalized).map_err(|err| anyhow!("Invalid decimal '{}': {}", input, err))
}

/// Parse a percentage string (`"13,25"`, `"95"`, `"13,25%"`) into a fraction.
///
/// # Examples
/// ```
/// use rendafixa::utils::parse_percent_br;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_percent_br("13,25").unwrap(), dec!(0.1325));
/// assert_eq!(parse_percent_br("95").unwrap(), dec!(0.95));
/// ```
pub fn parse_percent_br(input: &str) -> Result<Decimal> {
    let percent = parse_decimal_br(input)?;
    Ok(percent / Decimal::ONE_HUNDRED)
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

/// Format with pt-BR separators, rounded half away from zero to `places`.
fn format_br(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", places as usize, rounded.abs());
    let (integer_part, fraction_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    if fraction_part.is_empty() {
        format!("{}{}", sign, group_thousands(integer_part))
    } else {
        format!("{}{},{}", sign, group_thousands(integer_part), fraction_part)
    }
}

/// Format as Brazilian Real: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use rendafixa::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(11258.75)), "R$ 11.258,75");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format!("R$ {}", format_br(value, 2))
}

/// Format a fraction as a percentage: 0.1325 -> "13,25%"
pub fn format_percent(fraction: Decimal) -> String {
    format!("{}%", format_br(fraction * Decimal::ONE_HUNDRED, 2))
}
