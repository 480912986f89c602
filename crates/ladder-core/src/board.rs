//! In-memory ranked board.
//!
//! Three structures are kept in lockstep:
//! - the score ledger: `customer → cumulative score` for O(1) point lookups
//! - the ranked order: a `BTreeSet<ScoreEntry>` sorted by descending score,
//!   then ascending customer id
//! - the rank index: `customer → zero-based position`, a snapshot rebuilt by
//!   [`Leaderboard::rebuild_ranks`] after every batch that changed membership
//!   or order
//!
//! A customer is on the board iff its cumulative score is strictly positive.
//! There is no explicit delete; a customer falls off when its score reaches
//! zero or below.
//!
//! Not thread-safe. `ladder-service` wraps the board in a single `RwLock`.

use std::collections::{BTreeSet, HashMap};

use crate::types::{CustomerId, RankedScore, Score, ScoreEntry};

/// What a single net delta did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Customer was absent and entered with a positive score.
    Inserted,
    /// Customer was present and stays with a new positive score.
    Updated,
    /// Customer was present and its score dropped to zero or below.
    Removed,
    /// Customer was absent and the delta was not positive.
    Ignored,
}

impl Outcome {
    /// Whether the customer is on the board after the operation.
    pub fn is_ranked(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }

    /// Whether ledger or ranked order were modified.
    pub fn changed(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Score ledger, ranked order and rank index.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    /// Primary storage: customer → cumulative score.
    ledger: HashMap<CustomerId, Score>,
    /// Ordered view, one entry per ledger key.
    ranked: BTreeSet<ScoreEntry>,
    /// Customer → zero-based position in `ranked`, valid after a rebuild.
    ranks: HashMap<CustomerId, usize>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one net delta to the ledger and ranked order.
    ///
    /// The rank index is left untouched; callers apply every delta of a batch
    /// and then call [`rebuild_ranks`](Self::rebuild_ranks) once so ranks
    /// reflect the complete post-batch state.
    pub fn apply_delta(&mut self, customer_id: CustomerId, delta: Score) -> Outcome {
        match self.ledger.get(&customer_id).copied() {
            Some(old) => {
                self.ranked.remove(&ScoreEntry::new(customer_id, old));
                let new = old + delta;
                if new.is_positive() {
                    self.ledger.insert(customer_id, new);
                    self.ranked.insert(ScoreEntry::new(customer_id, new));
                    Outcome::Updated
                } else {
                    self.ledger.remove(&customer_id);
                    Outcome::Removed
                }
            }
            None if delta.is_positive() => {
                self.ledger.insert(customer_id, delta);
                self.ranked.insert(ScoreEntry::new(customer_id, delta));
                Outcome::Inserted
            }
            None => Outcome::Ignored,
        }
    }

    /// Reassign zero-based positions by enumerating the ranked order once.
    pub fn rebuild_ranks(&mut self) {
        self.ranks = self
            .ranked
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.customer_id, position))
            .collect();
    }

    /// Current cumulative score of a ranked customer.
    pub fn score_of(&self, customer_id: CustomerId) -> Option<Score> {
        self.ledger.get(&customer_id).copied()
    }

    /// Zero-based position from the last rank index rebuild.
    pub fn position_of(&self, customer_id: CustomerId) -> Option<usize> {
        self.ranks.get(&customer_id).copied()
    }

    /// Number of ranked customers.
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Entries in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.ranked.iter()
    }

    /// Skip `skip` entries, take up to `take`, annotating 1-based ranks.
    pub fn window(&self, skip: usize, take: usize) -> Vec<RankedScore> {
        self.ranked
            .iter()
            .skip(skip)
            .take(take)
            .enumerate()
            .map(|(i, entry)| RankedScore {
                customer_id: entry.customer_id,
                score: entry.score,
                rank: (skip + i + 1) as u64,
            })
            .collect()
    }

    /// Drop every customer.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.ranked.clear();
        self.ranks.clear();
    }

    /// Check the joint invariants of ledger, ranked order and rank index.
    ///
    /// Returns a description of the first violation found. Intended for
    /// tests and debug assertions.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.ledger.len() != self.ranked.len() {
            return Err(format!(
                "ledger has {} keys but ranked order has {} entries",
                self.ledger.len(),
                self.ranked.len()
            ));
        }
        let mut previous: Option<&ScoreEntry> = None;
        for (position, entry) in self.ranked.iter().enumerate() {
            if !entry.score.is_positive() {
                return Err(format!(
                    "{} ranked with non-positive score {}",
                    entry.customer_id, entry.score
                ));
            }
            if self.ledger.get(&entry.customer_id) != Some(&entry.score) {
                return Err(format!("{} disagrees with ledger", entry.customer_id));
            }
            if let Some(prev) = previous {
                if prev >= entry {
                    return Err(format!(
                        "{} out of order after {}",
                        entry.customer_id, prev.customer_id
                    ));
                }
            }
            if self.ranks.get(&entry.customer_id) != Some(&position) {
                return Err(format!("{} stale rank at position {position}", entry.customer_id));
            }
            previous = Some(entry);
        }
        if self.ranks.len() != self.ranked.len() {
            return Err(format!(
                "rank index has {} keys for {} entries",
                self.ranks.len(),
                self.ranked.len()
            ));
        }
        Ok(())
    }
}
