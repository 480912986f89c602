//! Range queries over the ranked board.
//!
//! Both query shapes reduce to a `(skip, take)` window over the ranked order;
//! rank numbers are always `skip + i + 1`. Out-of-range or inverted input
//! yields an empty or truncated result, never an error.

use crate::board::Leaderboard;
use crate::types::{CustomerId, RankedScore};

/// A `(skip, take)` slice of the ranked order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub skip: usize,
    pub take: usize,
}

fn to_usize(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

/// Window for 1-based inclusive ranks `start..=end`.
///
/// `start <= 0` is clamped to 1; `start > end` (after clamping) is `None`.
pub fn rank_window(start: i64, end: i64) -> Option<Window> {
    let start = start.max(1);
    if start > end {
        return None;
    }
    Some(Window {
        skip: to_usize(start - 1),
        take: to_usize(end.saturating_sub(start).saturating_add(1)),
    })
}

/// Window around the customer at zero-based `center`.
///
/// `before` and `after` count neighbouring ranks on each side; absent or
/// negative values mean 0. The take count is `after + center + 1 - skip`.
pub fn customer_window(center: usize, before: Option<i64>, after: Option<i64>) -> Window {
    let before = to_usize(before.unwrap_or(0));
    let after = to_usize(after.unwrap_or(0));
    let skip = center.saturating_sub(before);
    let take = after.saturating_add(center).saturating_add(1) - skip;
    Window { skip, take }
}

impl Leaderboard {
    /// Entries ranked `start..=end` (1-based, inclusive).
    pub fn by_rank(&self, start: i64, end: i64) -> Vec<RankedScore> {
        match rank_window(start, end) {
            Some(w) => self.window(w.skip, w.take),
            None => Vec::new(),
        }
    }

    /// The customer's row with up to `before` rows above and `after` rows
    /// below it. Empty when the customer is not ranked.
    pub fn around_customer(
        &self,
        customer_id: CustomerId,
        before: Option<i64>,
        after: Option<i64>,
    ) -> Vec<RankedScore> {
        match self.position_of(customer_id) {
            Some(center) => {
                let w = customer_window(center, before, after);
                self.window(w.skip, w.take)
            }
            None => Vec::new(),
        }
    }
}
