//! Boundary validation for submitted deltas and identities.
//!
//! The intake queue trusts its input; everything that reaches it has passed
//! through these checks first.

use crate::constants::{MAX_DELTA_POINTS, MIN_DELTA_POINTS};
use crate::error::ScoreError;
use crate::types::{CustomerId, Score};

/// Accept deltas within `MIN_DELTA_POINTS..=MAX_DELTA_POINTS`.
pub fn validate_delta(delta: Score) -> Result<Score, ScoreError> {
    let range = Score::from_points(MIN_DELTA_POINTS)..=Score::from_points(MAX_DELTA_POINTS);
    if range.contains(&delta) {
        Ok(delta)
    } else {
        Err(ScoreError::OutOfRange(delta.to_string()))
    }
}

/// Parse and range-check a raw delta string.
pub fn parse_delta(raw: &str) -> Result<Score, ScoreError> {
    validate_delta(raw.parse()?)
}

/// Parse a raw customer identity.
pub fn parse_customer_id(raw: &str) -> Result<CustomerId, ScoreError> {
    raw.parse()
}
