use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// Expected, user-facing outcomes of registry operations.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum PollError {
    #[error("Invalid poll format: {0}")]
    InvalidFormat(String),
    #[error("Poll {0} not found")]
    PollNotFound(String),
    #[error("Poll is closed")]
    PollClosed,
    #[error("Already voted in this poll")]
    AlreadyVoted,
    #[error("Option {position} does not exist (poll has {count} options)")]
    InvalidOption { position: usize, count: usize },
    #[error("Poll is already closed")]
    AlreadyClosed,
    #[error("Only the poll author can close it")]
    NotAuthor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PersistOp {
    CreatePoll,
    CastVote,
    ClosePoll,
}

impl fmt::Display for PersistOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistOp::CreatePoll => write!(f, "persist poll"),
            PersistOp::CastVote => write!(f, "persist vote"),
            PersistOp::ClosePoll => write!(f, "persist close"),
        }
    }
}

/// Non-fatal note that the durable store did not confirm a committed change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceWarning {
    pub operation: PersistOp,
    pub poll_id: String,
    pub reason: String,
}

impl fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {} for {}: {}", self.operation, self.poll_id, self.reason)
    }
}

/// A result that was committed in memory, plus any warning from the durable store.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    pub value: T,
    pub warning: Option<PersistenceWarning>,
}

impl<T> Committed<T> {
    pub fn with_warning(value: T, warning: Option<PersistenceWarning>) -> Self {
        Self { value, warning }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

pub type Result<T> = std::result::Result<T, PollError>;
