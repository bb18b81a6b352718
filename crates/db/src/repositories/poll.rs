//! Poll repository.

use std::sync::Arc;

use crate::entities::{poll, vote_option, Poll, VoteOption};
use ballot_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Poll repository for database operations.
#[derive(Clone, Debug)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning an error if it does not exist.
    pub async fn get_by_id(&self, id: i64) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::InvalidPoll(format!("poll not found: {id}")))
    }

    /// Get a poll's options ordered by option index.
    pub async fn options(&self, poll_id: i64) -> AppResult<Vec<vote_option::Model>> {
        VoteOption::find()
            .filter(vote_option::Column::PollId.eq(poll_id))
            .order_by_asc(vote_option::Column::Number)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Read the current `finished` flag from the store.
    pub async fn is_finished(&self, poll_id: i64) -> AppResult<bool> {
        Ok(self.get_by_id(poll_id).await?.finished)
    }

    /// Set `finished = true`. Idempotent; calling it on a finished poll is a no-op.
    pub async fn mark_finished(&self, poll_id: i64) -> AppResult<()> {
        Poll::update_many()
            .col_expr(poll::Column::Finished, Expr::value(true))
            .filter(poll::Column::Id.eq(poll_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
