use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use pollbot_shared::models::*;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Duplicate vote by {voter} in {poll_id}")]
    DuplicateVote { poll_id: PollId, voter: String },
    #[error("Poll {0} not found in store")]
    NotFound(PollId),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable backing for polls and votes.
///
/// Every write is best-effort from the registry's point of view: the in-memory
/// state is already committed when these are called.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    /// Idempotent on `poll.id`.
    async fn persist_poll(&self, poll: &Poll) -> Result<(), StoreError>;
    /// Rejects a second vote for the same `(poll_id, voter)`.
    async fn persist_vote(&self, vote: &Vote) -> Result<(), StoreError>;
    async fn persist_close(&self, poll_id: &str) -> Result<(), StoreError>;
    /// Loads the poll row; `votes` on the result is empty.
    async fn load_poll(&self, poll_id: &str) -> Result<Option<Poll>, StoreError>;
    async fn load_votes_for_poll(&self, poll_id: &str) -> Result<Vec<Vote>, StoreError>;
    async fn list_poll_ids(&self) -> Result<Vec<PollId>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    polls: Mutex<HashMap<PollId, Poll>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PollId, Poll>>, StoreError> {
        self.polls
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn persist_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let mut polls = self.lock()?;
        polls.entry(poll.id.clone()).or_insert_with(|| Poll {
            votes: HashMap::new(),
            ..poll.clone()
        });
        Ok(())
    }

    async fn persist_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let mut polls = self.lock()?;
        let poll = polls
            .get_mut(&vote.poll_id)
            .ok_or_else(|| StoreError::NotFound(vote.poll_id.clone()))?;
        if poll.votes.contains_key(&vote.voter) {
            return Err(StoreError::DuplicateVote {
                poll_id: vote.poll_id.clone(),
                voter: vote.voter.clone(),
            });
        }
        poll.votes.insert(vote.voter.clone(), vote.option_position);
        Ok(())
    }

    async fn persist_close(&self, poll_id: &str) -> Result<(), StoreError> {
        let mut polls = self.lock()?;
        let poll = polls
            .get_mut(poll_id)
            .ok_or_else(|| StoreError::NotFound(poll_id.to_string()))?;
        poll.closed = true;
        Ok(())
    }

    async fn load_poll(&self, poll_id: &str) -> Result<Option<Poll>, StoreError> {
        let polls = self.lock()?;
        Ok(polls.get(poll_id).map(|p| Poll {
            votes: HashMap::new(),
            ..p.clone()
        }))
    }

    async fn load_votes_for_poll(&self, poll_id: &str) -> Result<Vec<Vote>, StoreError> {
        let polls = self.lock()?;
        let mut votes: Vec<Vote> = polls
            .get(poll_id)
            .map(|p| {
                p.votes
                    .iter()
                    .map(|(voter, &option_position)| Vote {
                        poll_id: p.id.clone(),
                        voter: voter.clone(),
                        option_position,
                    })
                    .collect()
            })
            .unwrap_or_default();
        votes.sort_by(|a, b| a.voter.cmp(&b.voter));
        Ok(votes)
    }

    async fn list_poll_ids(&self) -> Result<Vec<PollId>, StoreError> {
        let polls = self.lock()?;
        let mut ids: Vec<PollId> = polls.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
