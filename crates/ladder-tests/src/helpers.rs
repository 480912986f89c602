//! Shared test helpers for integration and property tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ladder_core::{CustomerId, RankedScore, Score};
use ladder_service::{RankingService, ServiceConfig};

/// Whole-point score.
pub fn pts(points: i64) -> Score {
    Score::from_points(points)
}

/// Parse a decimal score literal.
pub fn dec(raw: &str) -> Score {
    raw.parse().unwrap()
}

/// A fresh service with the default one-second interval.
///
/// Tests drive batches by hand with `run_batch`.
pub fn service() -> Arc<RankingService> {
    RankingService::new(ServiceConfig::default())
}

/// A fresh service whose batch task ticks every `ms` milliseconds.
pub fn fast_service(ms: u64) -> Arc<RankingService> {
    RankingService::new(ServiceConfig::default().with_batch_interval(Duration::from_millis(ms)))
}

/// Submit whole-point deltas for `(customer, points)` pairs.
pub fn submit_all(svc: &RankingService, deltas: &[(i64, i64)]) {
    for &(customer, points) in deltas {
        svc.submit(CustomerId(customer), pts(points)).unwrap();
    }
}

/// Customer ids in the order returned.
pub fn ids(rows: &[RankedScore]) -> Vec<i64> {
    rows.iter().map(|r| r.customer_id.get()).collect()
}

/// Assert the rows are strictly ordered (score desc, id asc) with positive
/// scores and ranks that increase by exactly one.
pub fn assert_well_ordered(rows: &[RankedScore]) {
    for row in rows {
        assert!(row.score.is_positive(), "non-positive score ranked: {row:?}");
    }
    for pair in rows.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.score > b.score || (a.score == b.score && a.customer_id < b.customer_id),
            "out of order: {a:?} before {b:?}"
        );
        assert_eq!(a.rank + 1, b.rank, "rank gap between {a:?} and {b:?}");
    }
}

/// Reference model: a plain map of cumulative scores, applying batches with
/// the same rules as the board (insert on positive, drop at or below zero,
/// ignore non-positive deltas for absent customers).
#[derive(Debug, Default)]
pub struct NaiveBoard {
    scores: BTreeMap<i64, Score>,
}

impl NaiveBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one batch of raw `(customer, delta)` pairs.
    pub fn apply(&mut self, batch: &[(i64, Score)]) {
        let mut net: BTreeMap<i64, Score> = BTreeMap::new();
        for &(customer, delta) in batch {
            *net.entry(customer).or_default() += delta;
        }
        for (customer, delta) in net {
            match self.scores.get(&customer).copied() {
                Some(current) => {
                    let next = current + delta;
                    if next.is_positive() {
                        self.scores.insert(customer, next);
                    } else {
                        self.scores.remove(&customer);
                    }
                }
                None if delta.is_positive() => {
                    self.scores.insert(customer, delta);
                }
                None => {}
            }
        }
    }

    /// Everything in rank order with 1-based ranks.
    pub fn ranked(&self) -> Vec<RankedScore> {
        let mut entries: Vec<(i64, Score)> = self.scores.iter().map(|(&c, &s)| (c, s)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (customer, score))| RankedScore {
                customer_id: CustomerId(customer),
                score,
                rank: i as u64 + 1,
            })
            .collect()
    }
}
