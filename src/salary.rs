use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MAX_SCALE: u32 = 12;

const MAX_DIGITS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalaryParseError {
    #[error("empty decimal value")]
    Empty,
    #[error("invalid decimal value: {0:?}")]
    Invalid(String),
    #[error("decimal value out of range: {0:?}")]
    OutOfRange(String),
}

/// Fixed-point `units / 10^scale`; compares by value, displays with its own scale.
#[derive(Debug, Clone, Copy)]
pub struct Salary {
    units: i128,
    scale: u32,
}

impl Salary {
    pub fn annualize(
        hourly: Salary,
        hours_per_year: u32,
        precision: u32,
    ) -> Result<Salary, SalaryParseError> {
        let units = hourly
            .units
            .checked_mul(i128::from(hours_per_year))
            .ok_or_else(|| SalaryParseError::OutOfRange(hourly.to_string()))?;
        Salary {
            units,
            scale: hourly.scale,
        }
        .rescale(precision)
    }

    pub fn rescale(self, target: u32) -> Result<Salary, SalaryParseError> {
        if target >= self.scale {
            let units = pow10(target - self.scale)
                .and_then(|factor| self.units.checked_mul(factor))
                .ok_or_else(|| SalaryParseError::OutOfRange(self.to_string()))?;
            return Ok(Salary {
                units,
                scale: target,
            });
        }

        let divisor = pow10(self.scale - target)
            .ok_or_else(|| SalaryParseError::OutOfRange(self.to_string()))?;
        let magnitude = self.units.abs();
        let mut quotient = magnitude / divisor;
        let twice_remainder = (magnitude % divisor) * 2;
        if twice_remainder > divisor || (twice_remainder == divisor && quotient % 2 == 1) {
            quotient += 1;
        }

        Ok(Salary {
            units: quotient * self.units.signum(),
            scale: target,
        })
    }

    fn split(&self) -> (i128, i128) {
        let divisor = 10_i128.pow(self.scale);
        (self.units / divisor, self.units % divisor)
    }
}

fn pow10(exp: u32) -> Option<i128> {
    10_i128.checked_pow(exp)
}

impl PartialEq for Salary {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Salary {}

impl PartialOrd for Salary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Salary {
    fn cmp(&self, other: &Self) -> Ordering {
        let (left_whole, left_fraction) = self.split();
        let (right_whole, right_fraction) = other.split();
        let scale = self.scale.max(other.scale);
        left_whole.cmp(&right_whole).then_with(|| {
            let left = left_fraction * 10_i128.pow(scale - self.scale);
            let right = right_fraction * 10_i128.pow(scale - other.scale);
            left.cmp(&right)
        })
    }
}

impl FromStr for Salary {
    type Err = SalaryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(SalaryParseError::Empty);
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(SalaryParseError::Invalid(raw.to_string()));
        }
        if fraction.len() > MAX_SCALE as usize || whole.len() + fraction.len() > MAX_DIGITS {
            return Err(SalaryParseError::OutOfRange(raw.to_string()));
        }

        let digits = format!("{whole}{fraction}");
        let magnitude = if digits.is_empty() {
            0
        } else {
            digits
                .parse::<i128>()
                .map_err(|_| SalaryParseError::OutOfRange(raw.to_string()))?
        };

        Ok(Salary {
            units: if negative { -magnitude } else { magnitude },
            scale: fraction.len() as u32,
        })
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let magnitude = self.units.unsigned_abs();
        if self.scale == 0 {
            return write!(f, "{sign}{magnitude}");
        }

        let divisor = 10_u128.pow(self.scale);
        write!(
            f,
            "{sign}{}.{:0width$}",
            magnitude / divisor,
            magnitude % divisor,
            width = self.scale as usize
        )
    }
}

impl Serialize for Salary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Salary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// `""` when not reported; `null` is also accepted on input.
pub mod blank_when_absent {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Salary;

    pub fn serialize<S: Serializer>(value: &Option<Salary>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(amount) => serializer.collect_str(amount),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Salary>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        match text.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
