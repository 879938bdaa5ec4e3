//! Currency amounts as integer minor units
//!
//! Sums over expenses must not drift, so amounts are carried as whole cents
//! (i64) everywhere inside the core. Floating point only appears at the API
//! boundary where JSON exchanges plain decimal numbers.

use crate::error::{Error, Result};

/// Largest accepted major-unit amount. Far beyond any plausible expense but
/// keeps the cent conversion safely inside i64.
const MAX_MAJOR: f64 = 1e15;

/// Convert a major-unit amount (e.g. 12.34) to whole cents.
///
/// Rejects non-finite, non-positive, and absurdly large values; rounds
/// half-away-from-zero to the nearest cent.
pub fn from_major(amount: f64) -> Result<i64> {
    if !amount.is_finite() {
        return Err(Error::InvalidRequest("Amount must be a number".into()));
    }
    if amount <= 0.0 {
        return Err(Error::InvalidRequest("Amount must be positive".into()));
    }
    if amount > MAX_MAJOR {
        return Err(Error::InvalidRequest("Amount too large".into()));
    }
    Ok((amount * 100.0).round() as i64)
}

/// Convert whole cents back to a major-unit number for presentation.
pub fn to_major(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Render cents as a plain decimal string, e.g. `1234` -> `"12.34"`.
pub fn format_major(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
