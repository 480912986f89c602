//! Intake queue for raw score deltas.
//!
//! Producers push under a short-lived mutex that is independent of the board
//! lock, so `submit` never waits on batch application or readers. A drain
//! swaps the whole buffer out, so every delta is handed to exactly one drain.
//!
//! Every [`clear`](IntakeQueue::clear) starts a new reset epoch. A drain
//! reports the epoch it was taken in, so a batch drained before a reset can
//! be recognised and dropped instead of resurrecting cleared deltas.
//!
//! The queue does not validate; callers range-check deltas before submitting.

use parking_lot::Mutex;

use crate::types::{CustomerId, Score};

/// A submitted `(customer, delta)` pair awaiting the next batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelta {
    pub customer_id: CustomerId,
    pub delta: Score,
}

impl PendingDelta {
    pub fn new(customer_id: CustomerId, delta: Score) -> Self {
        Self { customer_id, delta }
    }
}

#[derive(Debug, Default)]
struct Pending {
    deltas: Vec<PendingDelta>,
    epoch: u64,
}

/// Multi-producer buffer drained by the batch applier.
#[derive(Debug, Default)]
pub struct IntakeQueue {
    pending: Mutex<Pending>,
}

impl IntakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a delta. Always accepted.
    pub fn submit(&self, customer_id: CustomerId, delta: Score) -> bool {
        self.pending
            .lock()
            .deltas
            .push(PendingDelta::new(customer_id, delta));
        true
    }

    /// Remove and return everything queued so far, in arrival order.
    pub fn drain_all(&self) -> Vec<PendingDelta> {
        self.drain_tagged().1
    }

    /// Like [`drain_all`](Self::drain_all), paired with the reset epoch the
    /// deltas were drained in.
    pub fn drain_tagged(&self) -> (u64, Vec<PendingDelta>) {
        let mut pending = self.pending.lock();
        (pending.epoch, std::mem::take(&mut pending.deltas))
    }

    /// Current reset epoch.
    pub fn epoch(&self) -> u64 {
        self.pending.lock().epoch
    }

    /// Number of deltas waiting for the next drain.
    pub fn len(&self) -> usize {
        self.pending.lock().deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().deltas.is_empty()
    }

    /// Discard everything queued and start a new reset epoch.
    pub fn clear(&self) {
        let mut pending = self.pending.lock();
        pending.deltas.clear();
        pending.epoch = pending.epoch.wrapping_add(1);
    }
}
