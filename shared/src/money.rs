//! Integer-cents money helpers (BRL)
//!
//! Amounts are stored and computed as whole cents (`i64`). Floating point
//! reais only exist transiently, for values typed by a user, and are rounded
//! to the nearest cent on conversion.

use rust_decimal::prelude::*;
use std::str::FromStr;

/// Rounding for reais → cents conversion of exact decimal input (half away from zero)
const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Convert a reais value to cents: `round(reais * 100)`.
///
/// Negative values are passed through; callers validate the sign.
pub fn reais_to_cents(reais: f64) -> i64 {
    (reais * 100.0).round() as i64
}

/// Exact decimal view of a cents amount (`150` → `1.50`)
pub fn cents_to_reais(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Render cents as BRL: `R$ 1.234,56`
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let reais = group_thousands(abs / 100);
    format!("{sign}R$ {reais},{:02}", abs % 100)
}

/// Parse a pt-BR formatted amount (`"R$ 1.234,56"`, `"12,5"`, `"7"`) into cents.
///
/// `.` is the thousands separator and `,` the decimal separator. The parse is
/// exact (no floating point) and rounds half away from zero to whole cents.
pub fn parse_reais(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let digits: String = rest
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if digits.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&digits).ok()?;
    let cents = (value * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, ROUNDING);
    let cents = cents.to_i64()?;
    Some(if negative { -cents } else { cents })
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{group:03}"));
    }
    groups.reverse();
    groups.join(".")
}
