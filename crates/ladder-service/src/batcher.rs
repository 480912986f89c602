//! Periodic batch applier.
//!
//! [`BatchTask`] runs [`RankingService::run_batch`] on a fixed cadence until
//! it is stopped. A batch in progress always completes: the stop signal is
//! only observed between ticks. There is no final drain on stop, so deltas
//! still queued at that point are not applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use ladder_core::error::LadderError;

use crate::service::RankingService;

/// Handle to a running batch task.
///
/// Dropping the handle signals the task to stop without waiting for it.
#[derive(Debug)]
pub struct BatchTask {
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl BatchTask {
    /// Spawn the batch loop on the current tokio runtime.
    pub(crate) fn spawn(service: Arc<RankingService>, period: Duration) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(service, period, stop_rx));
        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn stop(mut self) -> Result<(), LadderError> {
        self.stop_tx.send_replace(true);
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| LadderError::Task(e.to_string()))?;
        }
        Ok(())
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for BatchTask {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

async fn run_loop(
    service: Arc<RankingService>,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_ms = period.as_millis() as u64, "batch task started");

    loop {
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            tick = ticker.tick() => {
                let lag = tick.elapsed();
                if lag > period {
                    warn!(lag_ms = lag.as_millis() as u64, "batch tick running late");
                }
                service.run_batch();
            }
        }
    }

    info!("batch task stopped");
}
