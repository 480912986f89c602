//! Ranking service handle.
//!
//! [`RankingService`] owns one [`Leaderboard`] behind a single `RwLock` and an
//! [`IntakeQueue`] with its own synchronisation. Writers only touch the
//! queue; the batch applier is the sole writer of the board, and queries take
//! the read lock, so a reader always sees the state between two whole batches.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use ladder_core::batch::{self, BatchReport};
use ladder_core::error::LadderError;
use ladder_core::validation::validate_delta;
use ladder_core::{CustomerId, IntakeQueue, Leaderboard, RankedScore, Score};

use crate::batcher::BatchTask;
use crate::config::ServiceConfig;

/// Shared handle over the board and its intake queue.
#[derive(Debug)]
pub struct RankingService {
    board: RwLock<Leaderboard>,
    intake: IntakeQueue,
    config: ServiceConfig,
}

impl RankingService {
    /// Create an empty service. Independent instances share nothing.
    pub fn new(config: ServiceConfig) -> Arc<Self> {
        Arc::new(Self {
            board: RwLock::new(Leaderboard::new()),
            intake: IntakeQueue::new(),
            config,
        })
    }

    /// Range-check `delta` and queue it for the next batch.
    ///
    /// Never waits on the board lock. The delta becomes visible to queries
    /// once the next batch has run.
    pub fn submit(&self, customer_id: CustomerId, delta: Score) -> Result<bool, LadderError> {
        let delta = validate_delta(delta)?;
        trace!(%customer_id, %delta, "queued score delta");
        Ok(self.intake.submit(customer_id, delta))
    }

    /// Entries ranked `start..=end` (1-based, inclusive).
    pub fn query_by_rank(&self, start: i64, end: i64) -> Vec<RankedScore> {
        self.board.read().by_rank(start, end)
    }

    /// The customer's row with `before` rows above and `after` rows below.
    pub fn query_by_customer(
        &self,
        customer_id: CustomerId,
        before: Option<i64>,
        after: Option<i64>,
    ) -> Vec<RankedScore> {
        self.board.read().around_customer(customer_id, before, after)
    }

    /// Drain, coalesce and apply everything queued so far.
    pub fn run_batch(&self) -> BatchReport {
        let report = batch::run_batch(&self.intake, &self.board);
        if !report.is_empty() {
            debug!(
                drained = report.drained,
                customers = report.customers,
                inserted = report.inserted,
                updated = report.updated,
                removed = report.removed,
                ignored = report.ignored,
                discarded = report.discarded,
                ranked = report.ranked,
                "applied score batch"
            );
        }
        if report.saturated > 0 {
            warn!(
                saturated = report.saturated,
                "score sums overflowed and were clamped to the maximum"
            );
        }
        report
    }

    /// Clear the board and the intake queue under the write lock.
    ///
    /// A batch that drained its deltas before the reset and is still waiting
    /// for the lock drops them, so nothing submitted before the reset
    /// survives it. For test isolation; not meant for production traffic.
    pub fn reset_all(&self) {
        let mut board = self.board.write();
        board.clear();
        self.intake.clear();
        info!("ranking state reset");
    }

    /// Spawn the periodic batch applier on the current tokio runtime.
    pub fn start(self: &Arc<Self>) -> BatchTask {
        BatchTask::spawn(Arc::clone(self), self.config.batch_interval)
    }

    // --- Read helpers ---

    /// Number of ranked customers.
    pub fn len(&self) -> usize {
        self.board.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.board.read().is_empty()
    }

    /// Deltas waiting for the next batch.
    pub fn pending(&self) -> usize {
        self.intake.len()
    }

    /// Cumulative score of a ranked customer.
    pub fn score_of(&self, customer_id: CustomerId) -> Option<Score> {
        self.board.read().score_of(customer_id)
    }

    /// 1-based rank of a ranked customer.
    pub fn rank_of(&self, customer_id: CustomerId) -> Option<u64> {
        self.board
            .read()
            .position_of(customer_id)
            .map(|p| p as u64 + 1)
    }

    /// The whole board in rank order.
    pub fn snapshot(&self) -> Vec<RankedScore> {
        self.board.read().window(0, usize::MAX)
    }

    /// Service configuration reference.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
