//! Engine constants. All scores are fixed-point (1 point = 10^8 units).

use std::time::Duration;

/// Number of decimal places a [`Score`](crate::types::Score) carries.
pub const SCORE_DECIMALS: u32 = 8;

/// Fixed-point units per whole point.
pub const SCORE_SCALE: i64 = 100_000_000;

/// Smallest delta accepted at the submit boundary, in whole points.
pub const MIN_DELTA_POINTS: i64 = -1_000;

/// Largest delta accepted at the submit boundary, in whole points.
pub const MAX_DELTA_POINTS: i64 = 1_000;

/// Default cadence of the batch applier.
pub const DEFAULT_BATCH_INTERVAL: Duration = Duration::from_secs(1);

/// User-facing message for malformed identities or numbers.
pub const INPUT_INVALID_MSG: &str = "input parameter format is incorrect, please check again";

/// User-facing message for deltas outside the accepted range.
pub const DELTA_OUT_OF_RANGE_MSG: &str =
    "score is invalid, please enter a number between -1000 and 1000";
