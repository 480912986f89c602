//! # ladder-core
//! Foundation types and the ranking engine for Ladder.
//!
//! - [`board::Leaderboard`]: score ledger, ranked order and rank index kept
//!   in lockstep
//! - [`intake::IntakeQueue`]: lock-independent buffer for incoming deltas
//! - [`batch`]: coalescing and single-transition application of a drained batch
//! - [`query`]: rank-window and customer-anchored window arithmetic
//!
//! Nothing in this crate is async or performs I/O. Synchronisation of the
//! board is left to the owner (see `ladder-service`).

pub mod batch;
pub mod board;
pub mod constants;
pub mod error;
pub mod intake;
pub mod query;
pub mod types;
pub mod validation;

pub use batch::{BatchReport, apply_batch, coalesce};
pub use board::{Leaderboard, Outcome};
pub use error::{LadderError, ScoreError};
pub use intake::{IntakeQueue, PendingDelta};
pub use types::{CustomerId, RankedScore, Score, ScoreEntry};
