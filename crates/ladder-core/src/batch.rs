//! Batch coalescing and application.
//!
//! A batch is everything drained from the [`IntakeQueue`] in one pass. Deltas
//! are summed per customer, then applied to the board under one write-lock
//! acquisition followed by a single rank index rebuild, so readers only ever
//! observe whole batches.
//!
//! A drain that loses the race with a reset (the queue's epoch moved on
//! between the drain and the write lock) is discarded whole.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::board::{Leaderboard, Outcome};
use crate::intake::{IntakeQueue, PendingDelta};
use crate::types::{CustomerId, Score};

/// Summary of one batch transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Raw deltas drained from the queue.
    pub drained: usize,
    /// Distinct customers after coalescing.
    pub customers: usize,
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
    /// Non-positive deltas for customers not on the board.
    pub ignored: usize,
    /// Updates whose sum overflowed and was clamped to the score bounds.
    pub saturated: usize,
    /// Drained deltas dropped because a reset happened after the drain.
    pub discarded: usize,
    /// Board size after the batch.
    pub ranked: usize,
}

impl BatchReport {
    /// True when nothing was drained.
    pub fn is_empty(&self) -> bool {
        self.drained == 0
    }

    /// True when ledger or ranked order were modified.
    pub fn changed(&self) -> bool {
        self.inserted + self.updated + self.removed > 0
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Inserted => self.inserted += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Removed => self.removed += 1,
            Outcome::Ignored => self.ignored += 1,
        }
    }
}

/// Sum deltas per customer. Order-independent.
///
/// Sums saturate at the `i64` unit bounds; a single batch would need tens of
/// millions of maximal deltas for one customer to get there.
pub fn coalesce<I>(deltas: I) -> HashMap<CustomerId, Score>
where
    I: IntoIterator<Item = PendingDelta>,
{
    let mut net: HashMap<CustomerId, Score> = HashMap::new();
    for PendingDelta { customer_id, delta } in deltas {
        *net.entry(customer_id).or_default() += delta;
    }
    net
}

/// Apply coalesced net deltas to the board, then rebuild the rank index once
/// if anything changed.
pub fn apply_batch(board: &mut Leaderboard, net: &HashMap<CustomerId, Score>) -> BatchReport {
    let mut report = BatchReport {
        customers: net.len(),
        ..BatchReport::default()
    };
    for (&customer_id, &delta) in net {
        let overflows = board
            .score_of(customer_id)
            .is_some_and(|score| score.checked_add(delta).is_none());
        if overflows {
            report.saturated += 1;
        }
        report.record(board.apply_delta(customer_id, delta));
    }
    if report.changed() {
        board.rebuild_ranks();
    }
    report.ranked = board.len();
    report
}

/// Drain `queue`, coalesce, and apply to `board` as one exclusive section.
///
/// An empty drain returns immediately without touching the lock. Resets
/// clear the queue while holding the write lock, so the epoch check below
/// cannot race with one.
pub fn run_batch(queue: &IntakeQueue, board: &RwLock<Leaderboard>) -> BatchReport {
    let (epoch, drained) = queue.drain_tagged();
    if drained.is_empty() {
        return BatchReport::default();
    }
    let count = drained.len();
    let net = coalesce(drained);

    let mut board = board.write();
    if queue.epoch() != epoch {
        return BatchReport {
            drained: count,
            discarded: count,
            ranked: board.len(),
            ..BatchReport::default()
        };
    }
    let mut report = apply_batch(&mut board, &net);
    report.drained = count;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn delta(c: i64, d: i64) -> PendingDelta {
        PendingDelta::new(CustomerId(c), Score::from_points(d))
    }

    // ------------------------------------------------------------------
    // coalesce
    // ------------------------------------------------------------------

    #[test]
    fn coalesce_sums_per_customer() {
        let net = coalesce(vec![delta(1, 100), delta(2, 5), delta(1, 10)]);
        assert_eq!(net.len(), 2);
        assert_eq!(net[&CustomerId(1)], Score::from_points(110));
        assert_eq!(net[&CustomerId(2)], Score::from_points(5));
    }

    #[test]
    fn coalesce_keeps_zero_net() {
        let net = coalesce(vec![delta(1, 5), delta(1, -5)]);
        assert_eq!(net[&CustomerId(1)], Score::ZERO);
    }

    // ------------------------------------------------------------------
    // apply_batch / run_batch
    // ------------------------------------------------------------------

    #[test]
    fn apply_batch_reports_outcomes() {
        let mut board = Leaderboard::new();
        apply_batch(&mut board, &coalesce(vec![delta(1, 10), delta(2, 10)]));

        let report = apply_batch(
            &mut board,
            &coalesce(vec![delta(1, 5), delta(2, -10), delta(3, 7), delta(4, -1)]),
        );
        assert_eq!(report.customers, 4);
        assert_eq!(report.updated, 1);
        assert_eq!(report.removed, 1);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.ranked, 2);
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn ignored_delta_does_not_suppress_rebuild() {
        let mut board = Leaderboard::new();
        apply_batch(&mut board, &coalesce(vec![delta(1, 10), delta(2, -3)]));
        assert_eq!(board.position_of(CustomerId(1)), Some(0));
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn run_batch_on_empty_queue_is_noop() {
        let queue = IntakeQueue::new();
        let board = RwLock::new(Leaderboard::new());
        let report = run_batch(&queue, &board);
        assert!(report.is_empty());
        assert!(!report.changed());
    }

    #[test]
    fn run_batch_drains_and_applies() {
        let queue = IntakeQueue::new();
        let board = RwLock::new(Leaderboard::new());
        queue.submit(CustomerId(10001), Score::from_points(155));
        queue.submit(CustomerId(10001), Score::from_points(-500));
        queue.submit(CustomerId(10002), Score::from_points(3));

        let report = run_batch(&queue, &board);
        assert_eq!(report.drained, 3);
        assert_eq!(report.customers, 2);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.inserted, 1);
        assert!(queue.is_empty());

        let board = board.read();
        assert_eq!(board.score_of(CustomerId(10001)), None);
        assert_eq!(board.position_of(CustomerId(10002)), Some(0));
    }

    #[test]
    fn overflowing_update_is_clamped_and_counted() {
        let mut board = Leaderboard::new();
        let near_max = Score::from_units(i64::MAX - 10);
        let mut net = HashMap::new();
        net.insert(CustomerId(1), near_max);
        apply_batch(&mut board, &net);

        let report = apply_batch(&mut board, &coalesce(vec![delta(1, 1)]));
        assert_eq!(report.saturated, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(board.score_of(CustomerId(1)), Some(Score::MAX));
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn batch_drained_before_reset_is_discarded() {
        let queue = Arc::new(IntakeQueue::new());
        let board = Arc::new(RwLock::new(Leaderboard::new()));
        queue.submit(CustomerId(1), Score::from_points(10));

        // Park the batch between its drain and the write lock.
        let guard = board.read();
        let batch = {
            let (queue, board) = (Arc::clone(&queue), Arc::clone(&board));
            thread::spawn(move || run_batch(&queue, &board))
        };
        while !queue.is_empty() {
            thread::yield_now();
        }
        queue.clear();
        drop(guard);

        let report = batch.join().unwrap();
        assert_eq!(report.drained, 1);
        assert_eq!(report.discarded, 1);
        assert!(!report.changed());
        assert!(board.read().is_empty());
    }

    #[test]
    fn batch_drained_after_reset_is_applied() {
        let queue = IntakeQueue::new();
        let board = RwLock::new(Leaderboard::new());
        queue.submit(CustomerId(1), Score::from_points(10));
        queue.clear();
        queue.submit(CustomerId(2), Score::from_points(20));

        let report = run_batch(&queue, &board);
        assert_eq!(report.discarded, 0);
        assert_eq!(report.inserted, 1);
        assert_eq!(board.read().score_of(CustomerId(2)), Some(Score::from_points(20)));
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    proptest! {
        /// One batch of many deltas lands on the same score as their sum.
        #[test]
        fn coalescing_matches_single_summed_delta(
            start in 1i64..1_000,
            deltas in prop::collection::vec(-1_000i64..=1_000, 1..20),
        ) {
            let mut batched = Leaderboard::new();
            apply_batch(&mut batched, &coalesce(vec![delta(7, start)]));
            let mut summed = Leaderboard::new();
            apply_batch(&mut summed, &coalesce(vec![delta(7, start)]));

            apply_batch(&mut batched, &coalesce(deltas.iter().map(|&d| delta(7, d))));
            let total: i64 = deltas.iter().sum();
            apply_batch(&mut summed, &coalesce(vec![delta(7, total)]));

            prop_assert_eq!(batched.score_of(CustomerId(7)), summed.score_of(CustomerId(7)));
        }

        /// Arrival order inside a batch never changes the result.
        #[test]
        fn coalescing_is_order_independent(
            deltas in prop::collection::vec((0i64..5, -1_000i64..=1_000), 0..40),
        ) {
            let forward = coalesce(deltas.iter().map(|&(c, d)| delta(c, d)));
            let backward = coalesce(deltas.iter().rev().map(|&(c, d)| delta(c, d)));
            prop_assert_eq!(forward, backward);
        }
    }
}
