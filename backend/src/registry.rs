use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use pollbot_shared::{models::*, validation, Committed, PersistenceWarning, PollError, Result};
use crate::persist::{PendingWrite, PersistJob, PollWriter, Persister};
use crate::store::{PollStore, StoreError};
use crate::utils::generate_poll_id;

#[derive(Debug, Default)]
struct PollState {
    closed: bool,
    votes: HashMap<String, usize>,
}

/// Immutable poll fields live outside the lock; only `closed` and `votes` are guarded.
#[derive(Debug)]
struct PollEntry {
    id: PollId,
    question: String,
    options: Vec<String>,
    author: String,
    state: Mutex<PollState>,
    writer: Option<PollWriter>,
}

impl PollEntry {
    fn new(
        id: PollId,
        question: String,
        options: Vec<String>,
        author: String,
        state: PollState,
        writer: Option<PollWriter>,
    ) -> Self {
        Self { id, question, options, author, state: Mutex::new(state), writer }
    }

    fn enqueue(&self, job: PersistJob) -> Option<PendingWrite> {
        self.writer.as_ref().map(|writer| writer.enqueue(job))
    }

    fn lock(&self) -> MutexGuard<'_, PollState> {
        // Every critical section is check-then-single-insert, so a poisoned
        // guard still holds a consistent state.
        self.state.lock().unwrap_or_else(|e| {
            error!(poll_id = %self.id, "Poll lock poisoned");
            e.into_inner()
        })
    }

    fn snapshot(&self) -> Poll {
        let state = self.lock();
        Poll {
            id: self.id.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            author: self.author.clone(),
            closed: state.closed,
            votes: state.votes.clone(),
        }
    }
}

/// Owns every poll. Lookups share a read lock on the id map; each poll's
/// mutable state has its own mutex, so polls never contend with each other.
#[derive(Default)]
pub struct PollRegistry {
    polls: RwLock<HashMap<PollId, Arc<PollEntry>>>,
    persister: Option<Persister>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<dyn PollStore>, timeout: Duration) -> Self {
        Self {
            polls: RwLock::new(HashMap::new()),
            persister: Some(Persister::new(store, timeout)),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persister.is_some()
    }

    pub fn len(&self) -> usize {
        self.polls.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, poll_id: &str) -> Result<Arc<PollEntry>> {
        self.polls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(poll_id)
            .cloned()
            .ok_or_else(|| PollError::PollNotFound(poll_id.to_string()))
    }

    fn writer(&self) -> Option<PollWriter> {
        self.persister.as_ref().map(Persister::writer)
    }

    async fn confirm(pending: Option<PendingWrite>) -> Option<PersistenceWarning> {
        match pending {
            Some(pending) => pending.confirm().await,
            None => None,
        }
    }

    #[instrument(skip(self, options), fields(poll_id))]
    pub async fn create_poll<S: AsRef<str>>(
        &self,
        question: &str,
        options: &[S],
        author: &str,
    ) -> Result<Committed<CreatedPoll>> {
        let NewPoll { question, options } = validation::validate_new_poll(question, options)?;

        let (entry, pending) = {
            let mut polls = self.polls.write().unwrap_or_else(PoisonError::into_inner);
            loop {
                if let Entry::Vacant(slot) = polls.entry(generate_poll_id()) {
                    let entry = Arc::new(PollEntry::new(
                        slot.key().clone(),
                        question,
                        options,
                        author.to_string(),
                        PollState::default(),
                        self.writer(),
                    ));
                    // Queued before the poll is visible, so its row is written first.
                    let pending = entry.enqueue(PersistJob::Poll(entry.snapshot()));
                    slot.insert(Arc::clone(&entry));
                    break (entry, pending);
                }
            }
        };

        tracing::Span::current().record("poll_id", entry.id.as_str());
        info!("🗳️ Created poll {} by {}", entry.id, entry.author);

        let created = CreatedPoll {
            id: entry.id.clone(),
            question: entry.question.clone(),
            options: entry.options.clone(),
        };
        let warning = Self::confirm(pending).await;
        Ok(Committed::with_warning(created, warning))
    }

    /// Checks run in this order: exists, open, first vote, valid position.
    #[instrument(skip(self))]
    pub async fn cast_vote(&self, poll_id: &str, voter: &str, position: usize) -> Result<Committed<VoteReceipt>> {
        let entry = self.get(poll_id)?;

        let pending = {
            let mut state = entry.lock();
            if state.closed {
                return Err(PollError::PollClosed);
            }
            if state.votes.contains_key(voter) {
                return Err(PollError::AlreadyVoted);
            }
            validation::validate_position(position, entry.options.len())?;
            state.votes.insert(voter.to_string(), position);
            entry.enqueue(PersistJob::Vote(Vote {
                poll_id: entry.id.clone(),
                voter: voter.to_string(),
                option_position: position,
            }))
        };

        debug!("Vote recorded");
        let receipt = VoteReceipt {
            poll_id: entry.id.clone(),
            question: entry.question.clone(),
            voter: voter.to_string(),
            option_position: position,
            option_label: entry.options[position - 1].clone(),
        };
        let warning = Self::confirm(pending).await;
        Ok(Committed::with_warning(receipt, warning))
    }

    /// Checks run in this order: exists, still open, requester is the author.
    #[instrument(skip(self))]
    pub async fn close_poll(&self, poll_id: &str, requester: &str) -> Result<Committed<CloseReceipt>> {
        let entry = self.get(poll_id)?;

        let (total_votes, pending) = {
            let mut state = entry.lock();
            if state.closed {
                return Err(PollError::AlreadyClosed);
            }
            if entry.author != requester {
                return Err(PollError::NotAuthor);
            }
            state.closed = true;
            (state.votes.len(), entry.enqueue(PersistJob::Close(entry.id.clone())))
        };

        info!("🔒 Closed poll {} with {} votes", entry.id, total_votes);
        let receipt = CloseReceipt {
            poll_id: entry.id.clone(),
            question: entry.question.clone(),
            total_votes,
        };
        let warning = Self::confirm(pending).await;
        Ok(Committed::with_warning(receipt, warning))
    }

    pub fn results(&self, poll_id: &str) -> Result<Tally> {
        let entry = self.get(poll_id)?;
        let mut counts = vec![0usize; entry.options.len()];

        let closed = {
            let state = entry.lock();
            for &position in state.votes.values() {
                match counts.get_mut(position.wrapping_sub(1)) {
                    Some(count) => *count += 1,
                    None => error!(poll_id = %entry.id, position, "Recorded vote outside option range"),
                }
            }
            state.closed
        };

        Ok(Tally {
            poll_id: entry.id.clone(),
            question: entry.question.clone(),
            closed,
            options: entry
                .options
                .iter()
                .zip(counts)
                .enumerate()
                .map(|(idx, (label, votes))| OptionTally { position: idx + 1, label: label.clone(), votes })
                .collect(),
        })
    }

    pub fn snapshot(&self, poll_id: &str) -> Result<Poll> {
        self.get(poll_id).map(|entry| entry.snapshot())
    }

    /// Loads every stored poll and its votes. Polls already in memory are left alone.
    pub async fn rehydrate(&self) -> std::result::Result<usize, StoreError> {
        let Some(persister) = &self.persister else { return Ok(0) };
        let store = persister.store();

        let mut loaded = 0;
        for poll_id in store.list_poll_ids().await? {
            let Some(poll) = store.load_poll(&poll_id).await? else {
                warn!("Poll {} listed but not loadable", poll_id);
                continue;
            };
            if poll.options.len() < validation::MIN_OPTIONS {
                error!(
                    "❌ Stored poll {} has {} options; corrupted record skipped",
                    poll.id,
                    poll.options.len()
                );
                continue;
            }

            let mut state = PollState { closed: poll.closed, votes: HashMap::new() };
            for vote in store.load_votes_for_poll(&poll.id).await? {
                if validation::validate_position(vote.option_position, poll.options.len()).is_err() {
                    warn!("Skipping out-of-range vote {} by {} in {}", vote.option_position, vote.voter, poll.id);
                    continue;
                }
                if state.votes.contains_key(&vote.voter) {
                    warn!("Skipping duplicate vote by {} in {}", vote.voter, poll.id);
                    continue;
                }
                state.votes.insert(vote.voter, vote.option_position);
            }

            let inserted = {
                let mut polls = self.polls.write().unwrap_or_else(PoisonError::into_inner);
                match polls.entry(poll.id.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(Arc::new(PollEntry::new(
                            poll.id,
                            poll.question,
                            poll.options,
                            poll.author,
                            state,
                            Some(persister.writer()),
                        )));
                        true
                    }
                    Entry::Occupied(_) => false,
                }
            };
            if inserted {
                loaded += 1;
            }
        }

        info!("📋 Rehydrated {} polls", loaded);
        Ok(loaded)
    }
}
