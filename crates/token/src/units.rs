//! Conversions between decimal strings and smallest-unit integers.
//!
//! Thin wrappers over [`alloy_primitives::utils`]. Parsing is stricter than
//! alloy's: signs, exponents and excess precision are rejected instead of
//! being accepted or truncated.

use alloy_primitives::{
    utils::{self, Unit},
    U256,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("`{0}` is not a decimal number")]
    NotANumber(String),

    #[error("`{amount}` has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("amount does not fit in 256 bits")]
    Overflow,

    #[error("{0} decimals is out of range")]
    Decimals(u8),
}

fn unit(decimals: u8) -> Result<Unit, UnitsError> {
    Unit::new(decimals).ok_or(UnitsError::Decimals(decimals))
}

/// `10^decimals`.
pub fn scale(decimals: u8) -> Result<U256, UnitsError> {
    unit(decimals).map(Unit::wei)
}

/// Parse a decimal string like `"0.5"` into the smallest unit.
///
/// Only plain unsigned decimal notation is accepted. Trailing fractional
/// zeros beyond `decimals` are tolerated; any other excess precision is an
/// error rather than a silent truncation.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (int, frac) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int) || !is_digits(frac) || (int.is_empty() && frac.is_empty()) {
        return Err(UnitsError::NotANumber(amount.to_string()));
    }

    let frac = frac.trim_end_matches('0');
    if frac.len() > usize::from(decimals) {
        return Err(UnitsError::TooPrecise {
            amount: amount.to_string(),
            decimals,
        });
    }

    unit(decimals)?;
    let int = if int.is_empty() { "0" } else { int };
    let normalized = if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    };

    // Input is plain digits by now, so alloy can only fail on size.
    utils::parse_units(&normalized, decimals)
        .map(Into::<U256>::into)
        .map_err(|_| UnitsError::Overflow)
}

/// Format a smallest-unit amount exactly, e.g. `1.0` or `0.000001`.
///
/// Trailing fractional zeros are dropped but at least one fractional digit
/// is kept.
pub fn format_units(raw: U256, decimals: u8) -> Result<String, UnitsError> {
    unit(decimals)?;
    let formatted =
        utils::format_units(raw, decimals).map_err(|_| UnitsError::Decimals(decimals))?;

    let trimmed = formatted.trim_end_matches('0');
    Ok(match trimmed.strip_suffix('.') {
        Some(int) => format!("{int}.0"),
        None => trimmed.to_string(),
    })
}

/// Format a smallest-unit amount rounded half-up to `places` fractional
/// digits, e.g. `1.0000`.
pub fn format_fixed(raw: U256, decimals: u8, places: u8) -> Result<String, UnitsError> {
    let scaled = if decimals > places {
        let divisor = scale(decimals - places)?;
        let quotient = raw / divisor;
        let remainder = raw % divisor;
        if remainder >= divisor - remainder {
            quotient + U256::from(1u64)
        } else {
            quotient
        }
    } else {
        raw.checked_mul(scale(places - decimals)?)
            .ok_or(UnitsError::Overflow)?
    };

    unit(places)?;
    let formatted = utils::format_units(scaled, places).map_err(|_| UnitsError::Decimals(places))?;
    let (int, frac) = formatted.split_once('.').unwrap_or((&formatted, ""));
    if places == 0 {
        return Ok(int.to_string());
    }

    let width = usize::from(places);
    Ok(format!("{int}.{frac:0<width$}"))
}
