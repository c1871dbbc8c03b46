//! Compact duration expression parsing.
//!
//! Age thresholds are given as a sequence of `<number><unit>` tokens that
//! are summed together, e.g. `2W` (two weeks), `1M2W` (one month and two
//! weeks), `90d` (ninety days). The result is a total in minutes.
//!
//! Units:
//!
//! | unit | meaning | minutes |
//! |------|---------|---------|
//! | `m`  | minute  | 1       |
//! | `h`  | hour    | 60      |
//! | `d`  | day     | 1440    |
//! | `w`  | week    | 10080   |
//! | `M`  | month   | 43200 (30 days) |
//! | `y`  | year    | 525600 (365 days) |
//!
//! `h`, `d`, `w` and `y` are accepted in either case; `m` is minutes and
//! `M` is months, so the case of that letter matters.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ReclaimError, Result};

/// Minutes per unit suffix, or `None` for an unrecognized unit.
fn unit_minutes(unit: &str) -> Option<u64> {
    match unit {
        "m" => Some(1),
        "h" | "H" => Some(60),
        "d" | "D" => Some(1440),
        "w" | "W" => Some(10080),
        "M" => Some(43200),
        "y" | "Y" => Some(525600),
        _ => None,
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"^([0-9]+)([a-zA-Z])").expect("valid token regex"))
}

/// Parse a duration expression into a total number of minutes.
///
/// Repeatedly matches a leading `<digits><unit>` token and accumulates
/// `digits * unit_minutes(unit)` until the expression is consumed.
///
/// # Errors
///
/// Returns [`ReclaimError::InvalidDuration`] if the expression is empty,
/// contains an unrecognized unit, leaves unconsumed text after the last
/// token, or totals zero minutes.
pub fn parse_duration(expr: &str) -> Result<u64> {
    let invalid = |message: &str| ReclaimError::InvalidDuration {
        value: expr.to_string(),
        message: message.to_string(),
    };

    if expr.is_empty() {
        return Err(invalid("expression is empty"));
    }

    let mut remainder = expr;
    let mut total: u64 = 0;

    while let Some(captures) = token_regex().captures(remainder) {
        let digits = &captures[1];
        let unit = &captures[2];

        let count: u64 = digits
            .parse()
            .map_err(|_| invalid(&format!("number '{digits}' is out of range")))?;
        let minutes =
            unit_minutes(unit).ok_or_else(|| invalid(&format!("unknown unit '{unit}'")))?;

        total = total
            .checked_add(count.saturating_mul(minutes))
            .ok_or_else(|| invalid("total duration overflows"))?;

        remainder = &remainder[captures[0].len()..];
    }

    if !remainder.is_empty() {
        return Err(invalid(&format!("unparseable trailing text '{remainder}'")));
    }

    if total == 0 {
        return Err(invalid("duration must be greater than zero"));
    }

    Ok(total)
}
