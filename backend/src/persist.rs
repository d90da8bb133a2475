use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};
use pollbot_shared::{models::*, PersistOp, PersistenceWarning};
use crate::store::{PollStore, StoreError};

pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_millis(1000);

/// A single durable write that follows an in-memory commit.
#[derive(Debug, Clone)]
pub enum PersistJob {
    Poll(Poll),
    Vote(Vote),
    Close(PollId),
}

impl PersistJob {
    pub fn operation(&self) -> PersistOp {
        match self {
            PersistJob::Poll(_) => PersistOp::CreatePoll,
            PersistJob::Vote(_) => PersistOp::CastVote,
            PersistJob::Close(_) => PersistOp::ClosePoll,
        }
    }

    pub fn poll_id(&self) -> &str {
        match self {
            PersistJob::Poll(poll) => &poll.id,
            PersistJob::Vote(vote) => &vote.poll_id,
            PersistJob::Close(id) => id,
        }
    }

    async fn run(self, store: Arc<dyn PollStore>) -> Result<(), StoreError> {
        match self {
            PersistJob::Poll(poll) => store.persist_poll(&poll).await,
            PersistJob::Vote(vote) => store.persist_vote(&vote).await,
            PersistJob::Close(id) => store.persist_close(&id).await,
        }
    }
}

type Ack = oneshot::Sender<Result<(), StoreError>>;

/// Builds one ordered writer per poll.
#[derive(Clone)]
pub struct Persister {
    store: Arc<dyn PollStore>,
    timeout: Duration,
}

impl Persister {
    pub fn new(store: Arc<dyn PollStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn store(&self) -> &Arc<dyn PollStore> {
        &self.store
    }

    /// Spawns a background task that applies one poll's writes in the order
    /// they were queued. The task ends when the writer is dropped.
    pub fn writer(&self) -> PollWriter {
        let (tx, mut rx) = mpsc::unbounded_channel::<(PersistJob, Ack)>();
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            while let Some((job, ack)) = rx.recv().await {
                let result = job.run(Arc::clone(&store)).await;
                let _ = ack.send(result);
            }
        });
        PollWriter { tx, timeout: self.timeout }
    }
}

#[derive(Debug, Clone)]
pub struct PollWriter {
    tx: mpsc::UnboundedSender<(PersistJob, Ack)>,
    timeout: Duration,
}

impl PollWriter {
    /// Queues `job` behind every earlier write for the same poll. Call it while
    /// the poll state is still locked so queue order matches commit order.
    pub fn enqueue(&self, job: PersistJob) -> PendingWrite {
        let operation = job.operation();
        let poll_id = job.poll_id().to_string();
        let (ack, confirmation) = oneshot::channel();
        if self.tx.send((job, ack)).is_err() {
            error!(poll_id = %poll_id, "Persistence worker is gone");
        }
        PendingWrite { operation, poll_id, confirmation, timeout: self.timeout }
    }
}

/// A queued write the caller may wait on for a bounded time.
#[derive(Debug)]
pub struct PendingWrite {
    operation: PersistOp,
    poll_id: PollId,
    confirmation: oneshot::Receiver<Result<(), StoreError>>,
    timeout: Duration,
}

impl PendingWrite {
    /// Returns a warning when the store fails or does not answer in time.
    /// A timed-out write stays queued and still runs.
    pub async fn confirm(self) -> Option<PersistenceWarning> {
        let Self { operation, poll_id, confirmation, timeout: limit } = self;

        let reason = match timeout(limit, confirmation).await {
            Ok(Ok(Ok(()))) => {
                debug!(poll_id = %poll_id, "{} confirmed", operation);
                return None;
            }
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(_)) => "persistence worker stopped".to_string(),
            Err(_) => format!("no confirmation within {} ms", limit.as_millis()),
        };

        let warning = PersistenceWarning { operation, poll_id, reason };
        warn!("⚠️ {}", warning);
        Some(warning)
    }
}
