//! Cross-crate test suite for Ladder.
//!
//! Integration tests live under `tests/`: the reference scenarios, concurrent
//! writers and readers against a live batch task, and property tests that
//! compare the board against a naive model.

pub mod helpers;
