use std::collections::HashMap;
use sqlx::PgPool;
use tracing::{debug, instrument};
use pollbot_shared::models::*;
use crate::store::{PollStore, StoreError};

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// `PollStore` backed by the `polls` and `poll_votes` tables.
#[derive(Debug, Clone)]
pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[rocket::async_trait]
impl PollStore for PgPollStore {
    #[instrument(skip(self, poll), fields(poll_id = %poll.id))]
    async fn persist_poll(&self, poll: &Poll) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO polls (id, question, options, author, closed)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&poll.id)
        .bind(&poll.question)
        .bind(&poll.options)
        .bind(&poll.author)
        .bind(poll.closed)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        debug!("Stored poll ({} rows)", result.rows_affected());
        Ok(())
    }

    #[instrument(skip(self, vote), fields(poll_id = %vote.poll_id))]
    async fn persist_vote(&self, vote: &Vote) -> Result<(), StoreError> {
        let position = i32::try_from(vote.option_position)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            "INSERT INTO poll_votes (poll_id, voter, option_position)
             VALUES ($1, $2, $3)",
        )
        .bind(&vote.poll_id)
        .bind(&vote.voter)
        .bind(position)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let (unique, foreign_key) = e
                .as_database_error()
                .map(|db| (db.is_unique_violation(), db.is_foreign_key_violation()))
                .unwrap_or((false, false));
            if unique {
                StoreError::DuplicateVote {
                    poll_id: vote.poll_id.clone(),
                    voter: vote.voter.clone(),
                }
            } else if foreign_key {
                StoreError::NotFound(vote.poll_id.clone())
            } else {
                db_error(e)
            }
        })?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn persist_close(&self, poll_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE polls SET closed = TRUE WHERE id = $1")
            .bind(poll_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(poll_id.to_string()));
        }
        Ok(())
    }

    async fn load_poll(&self, poll_id: &str) -> Result<Option<Poll>, StoreError> {
        let record = sqlx::query_as::<_, (String, String, Vec<String>, String, bool)>(
            "SELECT id, question, options, author, closed FROM polls WHERE id = $1",
        )
        .bind(poll_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        let Some((id, question, options, author, closed)) = record else { return Ok(None) };

        Ok(Some(Poll {
            id,
            question,
            options,
            author,
            closed,
            votes: HashMap::new(),
        }))
    }

    async fn load_votes_for_poll(&self, poll_id: &str) -> Result<Vec<Vote>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, i32)>(
            "SELECT poll_id, voter, option_position FROM poll_votes
             WHERE poll_id = $1 ORDER BY cast_at",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        // Negative positions cannot come from the registry; map them to 0 so
        // rehydration rejects them with the other out-of-range values.
        Ok(rows
            .into_iter()
            .map(|(poll_id, voter, position)| Vote {
                poll_id,
                voter,
                option_position: usize::try_from(position).unwrap_or(0),
            })
            .collect())
    }

    async fn list_poll_ids(&self) -> Result<Vec<PollId>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT id FROM polls ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)
    }
}
