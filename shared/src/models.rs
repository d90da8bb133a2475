use serde::{Serialize, Deserialize};
use std::collections::HashMap;

pub type PollId = String;

/// Read-only copy of a poll handed out by the registry and the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
    pub author: String,
    pub closed: bool,
    /// Voter name to 1-based option position.
    pub votes: HashMap<String, usize>,
}

/// One persisted vote, unique on `(poll_id, voter)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub poll_id: PollId,
    pub voter: String,
    pub option_position: usize,
}

/// Validated creation input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPoll {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPoll {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub poll_id: PollId,
    pub question: String,
    pub voter: String,
    pub option_position: usize,
    pub option_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloseReceipt {
    pub poll_id: PollId,
    pub question: String,
    pub total_votes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub position: usize,
    pub label: String,
    pub votes: usize,
}

/// Per-option counts in creation order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub poll_id: PollId,
    pub question: String,
    pub closed: bool,
    pub options: Vec<OptionTally>,
}

impl Poll {
    pub fn total_votes(&self) -> usize {
        self.votes.len()
    }
}

impl Tally {
    pub fn total_votes(&self) -> usize {
        self.options.iter().map(|o| o.votes).sum()
    }

    pub fn counts(&self) -> Vec<(&str, usize)> {
        self.options.iter().map(|o| (o.label.as_str(), o.votes)).collect()
    }
}
