//! Parsing of transaction amount cells.
//!
//! Amount cells render as e.g. `"+ 2,100.98 USD"`: an optional sign, a
//! thousands-separated figure, and a 4-character currency suffix. Comparisons
//! need the numeric value, exact to the cent.

use crate::error::{ProbeError, Result};

const CURRENCY_SUFFIX_CHARS: usize = 4;

/// Parse an amount cell into cents.
pub fn parse_amount(raw: &str) -> Result<i64> {
    let total = raw.chars().count();
    if total <= CURRENCY_SUFFIX_CHARS {
        return Err(ProbeError::Amount(format!(
            "Amount cell too short: {:?}",
            raw
        )));
    }

    let cleaned: String = raw
        .chars()
        .take(total - CURRENCY_SUFFIX_CHARS)
        .filter(|c| *c != ',' && *c != ' ')
        .collect();

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    if digits.is_empty() {
        return Err(ProbeError::Amount(format!("No digits in {:?}", raw)));
    }

    let (whole, fraction) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    if fraction.len() > 2 {
        return Err(ProbeError::Amount(format!(
            "More than two fraction digits in {:?}",
            raw
        )));
    }

    let whole: i64 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| ProbeError::Amount(format!("Bad figure in {:?}", raw)))?
    };

    let mut cents_part: i64 = if fraction.is_empty() {
        0
    } else {
        fraction
            .parse()
            .map_err(|_| ProbeError::Amount(format!("Bad fraction in {:?}", raw)))?
    };
    if fraction.len() == 1 {
        cents_part *= 10;
    }

    let cents = whole
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents_part))
        .ok_or_else(|| ProbeError::Amount(format!("Amount out of range: {:?}", raw)))?;

    Ok(if negative { -cents } else { cents })
}
