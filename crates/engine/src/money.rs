use std::{fmt, str::FromStr};

use crate::EngineError;

/// Signed money amount represented as **integer cents**.
///
/// Balances and transaction amounts are stored as exact cents and only turned
/// into floating point numbers at the transport boundary (see
/// [`MoneyCents::to_f64`]).
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(123_45);
/// assert_eq!(amount.cents(), 12345);
/// assert_eq!(amount.to_string(), "123.45");
/// assert_eq!(amount.to_f64(), 123.45);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Transport representation.
    ///
    /// Dividing the exact cents by 100 yields the double closest to the
    /// two-decimal value, so `123.45` stays `123.45`.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

/// Digits of an integer magnitude would not fit in `i64`.
const MAX_DIGITS: usize = 19;

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a finite decimal number into cents.
    ///
    /// Accepts an optional sign, `.` or `,` as decimal separator, a missing
    /// integer or fractional part (`".5"`, `"7."`) and an exponent (`"1e3"`,
    /// `"2.5E-1"`). Values with more than two decimals are rounded to the
    /// nearest cent, halves away from zero (`"1.005"` is `1.01`). `NaN`,
    /// infinities, trailing garbage and amounts beyond `i64` cents are
    /// rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |what: &str| EngineError::Validation(format!("{what} amount: {s:?}"));

        let trimmed = s.trim();
        let (negative, number) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let number = number.replace(',', ".");
        let (mantissa, exponent) = match number.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => {
                let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
                if digits.is_empty() || !all_digits(digits) {
                    return Err(invalid("invalid"));
                }
                let exponent: i64 = exponent.parse().map_err(|_| invalid("out of range"))?;
                (mantissa, exponent)
            }
            None => (number.as_str(), 0),
        };

        let (units, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if units.len() + fraction.len() == 0 || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid("invalid"));
        }

        // value = digits * 10^(shift - 2) so `digits * 10^shift` is in cents.
        let digits = format!("{units}{fraction}");
        let digits = digits.trim_start_matches('0');
        let shift = exponent
            .checked_add(2)
            .and_then(|shift| shift.checked_sub(fraction.len() as i64))
            .ok_or_else(|| invalid("out of range"))?;

        let cents = if digits.is_empty() {
            0
        } else if shift >= 0 {
            let shift = shift as usize;
            if digits.len() + shift > MAX_DIGITS {
                return Err(invalid("out of range"));
            }
            format!("{digits}{}", "0".repeat(shift))
                .parse::<i64>()
                .map_err(|_| invalid("out of range"))?
        } else {
            let dropped = shift.unsigned_abs() as usize;
            let (kept, rest) = digits.split_at(digits.len().saturating_sub(dropped));
            // Fewer digits than dropped positions means the first dropped one is a 0.
            let round_up = dropped <= digits.len() && rest.as_bytes()[0] >= b'5';
            let kept: i64 = if kept.is_empty() {
                0
            } else {
                kept.parse().map_err(|_| invalid("out of range"))?
            };
            if round_up {
                kept.checked_add(1).ok_or_else(|| invalid("out of range"))?
            } else {
                kept
            }
        };

        Ok(MoneyCents(if negative { -cents } else { cents }))
    }
}
