//! Core value types: customer identity, fixed-point score, board entries.
//!
//! Scores are fixed-point decimals stored as `i64` units
//! (1 point = [`SCORE_SCALE`] units), so sums never drift.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de, ser};
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg};
use std::str::FromStr;

use crate::constants::{SCORE_DECIMALS, SCORE_SCALE};
use crate::error::ScoreError;

/// Externally assigned customer identity.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct CustomerId(pub i64);

impl CustomerId {
    /// Raw integer identity.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for CustomerId {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ScoreError::InvalidCustomerId(s.to_string()))
    }
}

/// Signed fixed-point decimal score with [`SCORE_DECIMALS`] fractional digits.
///
/// Arithmetic saturates at the `i64` bounds ([`Score::MAX`] is just over
/// 92 billion points) rather than wrapping. The batch engine counts every
/// clamped update in its report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Score(i64);

impl Score {
    pub const ZERO: Self = Self(0);
    /// Largest representable score; sums that would exceed it clamp here.
    pub const MAX: Self = Self(i64::MAX);

    /// Build from raw fixed-point units.
    pub const fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Build from a whole number of points, saturating on overflow.
    pub const fn from_points(points: i64) -> Self {
        Self(points.saturating_mul(SCORE_SCALE))
    }

    /// Raw fixed-point units.
    pub const fn units(self) -> i64 {
        self.0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Add for Score {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl Neg for Score {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for Score {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCORE_SCALE as u64;
        let (whole, frac) = (abs / scale, abs % scale);
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let digits = format!("{frac:0width$}", width = SCORE_DECIMALS as usize);
        write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for Score {
    type Err = ScoreError;

    /// Parse `[+-]digits[.digits]` with at most [`SCORE_DECIMALS`] fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScoreError::Invalid(s.to_string());
        let trimmed = s.trim();
        let (negative, body) = if let Some(rest) = trimmed.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            (false, rest)
        } else {
            (false, trimmed)
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }
        if frac_part.len() > SCORE_DECIMALS as usize {
            return Err(invalid());
        }

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let frac: i64 = if frac_part.is_empty() {
            0
        } else {
            let pad = SCORE_DECIMALS - frac_part.len() as u32;
            frac_part.parse::<i64>().map_err(|_| invalid())? * 10_i64.pow(pad)
        };

        let units = whole
            .checked_mul(SCORE_SCALE)
            .and_then(|u| u.checked_add(frac))
            .ok_or_else(invalid)?;
        Ok(Self(if negative { -units } else { units }))
    }
}

/// Written as a JSON number carrying the exact decimal text, so large
/// cumulative scores keep every fractional digit.
impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number: Number = self.to_string().parse().map_err(ser::Error::custom)?;
        number.serialize(serializer)
    }
}

/// Accepts a JSON number or a decimal string.
impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(raw) => raw.parse().map_err(de::Error::custom),
            Value::Number(n) => {
                let raw = n.to_string();
                // Exponent forms ("1e3") go through the nearest f64.
                raw.parse()
                    .or_else(|_| match n.as_f64() {
                        Some(v) => v.to_string().parse(),
                        None => Err(ScoreError::Invalid(raw.clone())),
                    })
                    .map_err(de::Error::custom)
            }
            other => Err(de::Error::custom(format!(
                "expected a decimal score, got {other}"
            ))),
        }
    }
}

/// A `(customer, score)` row of the ranked order.
///
/// Ordered by descending score, then ascending customer id. Entries are never
/// mutated in place; a score change is a remove followed by an insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScoreEntry {
    pub customer_id: CustomerId,
    pub score: Score,
}

impl ScoreEntry {
    pub fn new(customer_id: CustomerId, score: Score) -> Self {
        Self { customer_id, score }
    }
}

impl Ord for ScoreEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.customer_id.cmp(&other.customer_id))
    }
}

impl PartialOrd for ScoreEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A query result row: an entry annotated with its 1-based rank.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RankedScore {
    pub customer_id: CustomerId,
    pub score: Score,
    pub rank: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(s: &str) -> Score {
        s.parse().unwrap()
    }

    // ------------------------------------------------------------------
    // Score parsing and formatting
    // ------------------------------------------------------------------

    #[test]
    fn parses_integers_and_fractions() {
        assert_eq!(score("110"), Score::from_points(110));
        assert_eq!(score("0.9").units(), 90_000_000);
        assert_eq!(score("-345").units(), -345 * SCORE_SCALE);
        assert_eq!(score("+2").units(), 2 * SCORE_SCALE);
        assert_eq!(score(".5").units(), 50_000_000);
        assert_eq!(score("7.").units(), 7 * SCORE_SCALE);
        assert_eq!(score(" 999.999 ").units(), 99_999_900_000);
    }

    #[test]
    fn rejects_malformed_scores() {
        for bad in ["", "-", ".", "1.2.3", "abc", "1e3", "0.123456789", "--1", "1 000"] {
            assert!(
                matches!(bad.parse::<Score>(), Err(ScoreError::Invalid(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_overflowing_score() {
        assert!("99999999999999999999".parse::<Score>().is_err());
        assert!("92233720369".parse::<Score>().is_err());
        assert!("92233720368".parse::<Score>().is_ok());
    }

    #[test]
    fn display_is_minimal() {
        assert_eq!(score("0.90").to_string(), "0.9");
        assert_eq!(score("110").to_string(), "110");
        assert_eq!(score("-345.5").to_string(), "-345.5");
        assert_eq!(score("999.999").to_string(), "999.999");
        assert_eq!(score("0.00000001").to_string(), "0.00000001");
        assert_eq!(Score::ZERO.to_string(), "0");
    }

    #[test]
    fn decimal_sum_has_no_drift() {
        let total: Score = std::iter::repeat_n(score("0.1"), 10).sum();
        assert_eq!(total, Score::from_points(1));
    }

    #[test]
    fn addition_saturates() {
        let max = Score::from_units(i64::MAX);
        assert_eq!(max + Score::from_points(1), max);
        assert_eq!(max.checked_add(Score::from_units(1)), None);
        assert_eq!(-Score::from_units(i64::MIN), Score::from_units(i64::MAX));
    }

    #[test]
    fn serde_round_trips_through_json_number() {
        let s = score("100.99");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "100.99");
        let back: Score = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn deserializes_from_string_and_integer() {
        let from_str: Score = serde_json::from_str("\"-12.5\"").unwrap();
        assert_eq!(from_str, score("-12.5"));
        let from_int: Score = serde_json::from_str("42").unwrap();
        assert_eq!(from_int, Score::from_points(42));
        let from_exp: Score = serde_json::from_str("1e3").unwrap();
        assert_eq!(from_exp, Score::from_points(1_000));
        assert!(serde_json::from_str::<Score>("true").is_err());
    }

    #[test]
    fn large_scores_serialize_without_losing_digits() {
        let big = score("123456789.12345678");
        assert_eq!(serde_json::to_string(&big).unwrap(), "123456789.12345678");
        assert_eq!(serde_json::to_string(&Score::MAX).unwrap(), "92233720368.54775807");
        assert_eq!(serde_json::to_string(&Score::from_points(110)).unwrap(), "110");

        let back: Score = serde_json::from_str("123456789.12345678").unwrap();
        assert_eq!(back, big);
    }

    // ------------------------------------------------------------------
    // Entry ordering
    // ------------------------------------------------------------------

    #[test]
    fn higher_score_sorts_first() {
        let a = ScoreEntry::new(CustomerId(2), Score::from_points(200));
        let b = ScoreEntry::new(CustomerId(1), Score::from_points(100));
        assert!(a < b);
    }

    #[test]
    fn ties_break_on_ascending_customer_id() {
        let a = ScoreEntry::new(CustomerId(3), Score::from_points(65));
        let b = ScoreEntry::new(CustomerId(7), Score::from_points(65));
        assert!(a < b);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn customer_id_parse() {
        assert_eq!("10001".parse::<CustomerId>().unwrap(), CustomerId(10001));
        assert!(matches!(
            "ten".parse::<CustomerId>(),
            Err(ScoreError::InvalidCustomerId(_))
        ));
    }

    #[test]
    fn ranked_score_uses_camel_case() {
        let row = RankedScore {
            customer_id: CustomerId(5),
            score: Score::from_points(2),
            rank: 1,
        };
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["customerId"], 5);
        assert_eq!(json["rank"], 1);
        assert_eq!(json["score"], 2.0);
    }
}
