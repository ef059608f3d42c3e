use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

/// A kwacha amount held as a whole number of ngwee (hundredths), so cap
/// arithmetic stays exact where `f64` sums would drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_ngwee(ngwee: i64) -> Self {
        Money(ngwee)
    }

    pub const fn from_kwacha(kwacha: i64) -> Self {
        Money(kwacha * 100)
    }

    /// Converts a kwacha value from user input, rounding to the ngwee.
    /// Rejects non-finite values and anything outside a sane range.
    pub fn from_f64(kwacha: f64) -> Option<Self> {
        if !kwacha.is_finite() {
            return None;
        }
        let ngwee = (kwacha * 100.0).round();
        if ngwee.abs() > 1e15 {
            return None;
        }
        Some(Money(ngwee as i64))
    }

    pub const fn ngwee(self) -> i64 {
        self.0
    }

    pub fn as_kwacha(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Whole-percent share of the amount, rounded half up to the ngwee.
    /// Computed in i128 so extreme amounts clamp instead of overflowing.
    pub fn percent(self, rate: i64) -> Money {
        let scaled = (i128::from(self.0) * i128::from(rate) + 50) / 100;
        Money(scaled.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64)
    }

    /// Whole-kwacha rendering with thousands separators, e.g. `K350,000`.
    pub fn grouped(self) -> String {
        let kwacha = self.0 / 100;
        let digits = kwacha.unsigned_abs().to_string();
        let mut out = String::new();
        if kwacha < 0 {
            out.push('-');
        }
        let lead = digits.len() % 3;
        for (i, ch) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - lead) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        format!("K{out}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "K{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

// The operators saturate like the accumulation paths do, so even absurd
// amounts from a hand-edited data file cannot overflow-panic a computation.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_kwacha())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_f64(value).ok_or_else(|| serde::de::Error::custom("amount must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f64_rounds_to_ngwee() {
        assert_eq!(Money::from_f64(0.50).unwrap().ngwee(), 50);
        assert_eq!(Money::from_f64(0.51).unwrap().ngwee(), 51);
        assert_eq!(Money::from_f64(159_999.50).unwrap().ngwee(), 15_999_950);
        assert!(Money::from_f64(f64::NAN).is_none());
        assert!(Money::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn display_uses_two_decimals() {
        assert_eq!(Money::from_ngwee(5000).to_string(), "K50.00");
        assert_eq!(Money::from_ngwee(50).to_string(), "K0.50");
        assert_eq!(Money::from_ngwee(-50).to_string(), "K-0.50");
    }

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(Money::from_kwacha(350_000).grouped(), "K350,000");
        assert_eq!(Money::from_kwacha(70_000).grouped(), "K70,000");
        assert_eq!(Money::from_kwacha(999).grouped(), "K999");
        assert_eq!(Money::from_kwacha(1_000_000).grouped(), "K1,000,000");
    }

    #[test]
    fn five_percent_of_one_thousand_is_fifty() {
        let tax = Money::from_kwacha(1000).percent(5);
        assert_eq!(tax, Money::from_kwacha(50));
        assert_eq!(tax.to_string(), "K50.00");
    }

    #[test]
    fn operators_saturate_at_the_extremes() {
        let max = Money::from_ngwee(i64::MAX);
        let min = Money::from_ngwee(i64::MIN);
        assert_eq!(max + Money::from_ngwee(1), max);
        assert_eq!(min - Money::from_ngwee(1), min);

        let mut total = max;
        total += Money::from_kwacha(1);
        assert_eq!(total, max);
    }

    #[test]
    fn json_round_trips_through_kwacha() {
        let amount = Money::from_ngwee(15_999_951);
        let json = serde_json::to_string(&amount).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
