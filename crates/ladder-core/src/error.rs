//! Error types for Ladder.
use thiserror::Error;

use crate::constants::{DELTA_OUT_OF_RANGE_MSG, INPUT_INVALID_MSG};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("{}", DELTA_OUT_OF_RANGE_MSG)] OutOfRange(String),
    #[error("{}", INPUT_INVALID_MSG)] Invalid(String),
    #[error("{}", INPUT_INVALID_MSG)] InvalidCustomerId(String),
}

impl ScoreError {
    /// The offending raw input, for logging.
    pub fn input(&self) -> &str {
        match self {
            Self::OutOfRange(s) | Self::Invalid(s) | Self::InvalidCustomerId(s) => s,
        }
    }
}

#[derive(Error, Debug)]
pub enum LadderError {
    #[error(transparent)] Score(#[from] ScoreError),
    #[error("batch task: {0}")] Task(String),
}
