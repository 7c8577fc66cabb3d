//! Native asset amounts.
//!
//! Amounts are fixed-point integers counted in stroops (1 XLM = 10^7 stroops)
//! so that nothing ever passes through floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Number of stroops in one unit of the native asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;
/// Maximum number of fractional digits the ledger accepts.
pub const DECIMAL_PLACES: usize = 7;

/// A strictly positive amount of the native asset, in stroops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NativeAmount(i64);

impl NativeAmount {
    /// Construct from raw stroops. Returns `None` unless `stroops > 0`.
    pub fn from_stroops(stroops: i64) -> Option<Self> {
        (stroops > 0).then_some(Self(stroops))
    }

    pub fn stroops(&self) -> i64 {
        self.0
    }
}

/// Render a stroop count as a 7-decimal string, the way the ledger API does.
pub fn format_stroops(stroops: i64) -> String {
    let sign = if stroops < 0 { "-" } else { "" };
    let abs = stroops.unsigned_abs();
    let unit = STROOPS_PER_UNIT as u64;
    format!("{sign}{}.{:07}", abs / unit, abs % unit)
}

impl fmt::Display for NativeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_stroops(self.0))
    }
}

impl FromStr for NativeAmount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TypesError::InvalidAmount {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("no digits"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("expected a plain decimal number"));
        }
        if frac.len() > DECIMAL_PLACES {
            return Err(invalid("more than 7 decimal places"));
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("too large"))?
        };
        let mut frac_stroops: i64 = 0;
        for (i, b) in frac.bytes().enumerate() {
            frac_stroops += i64::from(b - b'0') * 10_i64.pow((DECIMAL_PLACES - 1 - i) as u32);
        }

        let stroops = whole_units
            .checked_mul(STROOPS_PER_UNIT)
            .and_then(|v| v.checked_add(frac_stroops))
            .ok_or_else(|| invalid("too large"))?;

        Self::from_stroops(stroops).ok_or_else(|| invalid("must be greater than zero"))
    }
}
