//! Poll vote repository.

use std::sync::Arc;

use crate::entities::{poll_vote, PollVote};
use ballot_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

/// Poll vote repository for database operations.
#[derive(Clone, Debug)]
pub struct PollVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PollVoteRepository {
    /// Create a new poll vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All ledger entries for a poll.
    pub async fn find_by_poll(&self, poll_id: i64) -> AppResult<Vec<poll_vote::Model>> {
        PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Option indices the voter currently holds for a poll.
    pub async fn voted_options(&self, poll_id: i64, voter_id: &str) -> AppResult<Vec<i32>> {
        let votes = PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .filter(poll_vote::Column::VoterId.eq(voter_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(votes.into_iter().map(|v| v.option_index).collect())
    }

    /// Voters who currently hold a ledger entry for the given option.
    pub async fn voters(&self, poll_id: i64, option_index: i32) -> AppResult<Vec<String>> {
        let votes = PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .filter(poll_vote::Column::OptionIndex.eq(option_index))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(votes.into_iter().map(|v| v.voter_id).collect())
    }

    /// Total number of ledger entries for a poll.
    pub async fn count_all(&self, poll_id: i64) -> AppResult<u64> {
        PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of ledger entries for a given option.
    ///
    /// An out-of-range option index simply matches no rows and yields 0.
    pub async fn count_for_option(&self, poll_id: i64, option_index: i32) -> AppResult<u64> {
        PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .filter(poll_vote::Column::OptionIndex.eq(option_index))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count distinct voters for a poll.
    pub async fn count_voters(&self, poll_id: i64) -> AppResult<u64> {
        let votes = self.find_by_poll(poll_id).await?;

        let mut unique_voters = std::collections::HashSet::new();
        for vote in votes {
            unique_voters.insert(vote.voter_id);
        }
        Ok(unique_voters.len() as u64)
    }
}
