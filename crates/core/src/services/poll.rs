//! Poll service.
//!
//! [`PollService`] owns poll lifecycle (create, load) and hands out [`Poll`]
//! aggregates. A [`Poll`] carries its immutable metadata in memory and issues
//! store transactions for everything mutable: the vote ledger, finalization,
//! and tallies.

use std::sync::Arc;

use ballot_common::{AppError, AppResult};
use ballot_db::{
    entities::{poll, poll_vote, vote_option, Poll as PollRow, PollVote, VoteOption},
    repositories::{PollRepository, PollVoteRepository},
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, NotSet, QueryFilter, QuerySelect, Set, TransactionError,
    TransactionTrait,
};
use tracing::debug;

/// Poll store: creates and loads polls and enforces all voting invariants.
#[derive(Clone)]
pub struct PollService {
    db: Arc<DatabaseConnection>,
    poll_repo: PollRepository,
    vote_repo: PollVoteRepository,
}

/// Input for creating a poll.
pub struct CreatePollInput {
    pub creator_id: String,
    pub message: String,
    /// Option labels in display order. Empty means "Yes"/"No".
    pub vote_options: Vec<String>,
    pub secret: bool,
    pub public: bool,
    /// Votes per user; clamped to `[1, number of options]` at creation.
    pub max_votes: i32,
}

impl CreatePollInput {
    /// A single-choice, non-secret, non-public poll with default options.
    #[must_use]
    pub fn new(creator_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            creator_id: creator_id.into(),
            message: message.into(),
            vote_options: Vec::new(),
            secret: false,
            public: false,
            max_votes: 1,
        }
    }
}

/// A loaded poll.
///
/// Metadata (message, options, flags) is immutable after creation and kept in
/// memory; the vote ledger and the `finished` flag live in the store and are
/// read fresh on every query.
#[derive(Clone, Debug)]
pub struct Poll {
    db: Arc<DatabaseConnection>,
    poll_repo: PollRepository,
    vote_repo: PollVoteRepository,
    id: i64,
    creator_id: String,
    message: String,
    vote_options: Vec<String>,
    secret: bool,
    public: bool,
    max_votes: i32,
}

fn options_or_default(vote_options: Vec<String>) -> Vec<String> {
    if vote_options.is_empty() {
        vec!["Yes".to_string(), "No".to_string()]
    } else {
        vote_options
    }
}

fn clamp_max_votes(requested: i32, num_options: usize) -> i32 {
    requested.clamp(1, num_options as i32)
}

impl PollService {
    /// Create a new poll service on top of an established connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let poll_repo = PollRepository::new(db.clone());
        let vote_repo = PollVoteRepository::new(db.clone());
        Self {
            db,
            poll_repo,
            vote_repo,
        }
    }

    /// Create a new poll without any votes.
    ///
    /// Ensures the backing schema exists, substitutes "Yes"/"No" for an empty
    /// option list, clamps `max_votes`, and inserts the poll row together
    /// with all option rows in a single transaction. Any store failure
    /// surfaces as [`AppError::InvalidPoll`]; no partial poll is ever
    /// observable.
    pub async fn create(&self, input: CreatePollInput) -> AppResult<Poll> {
        ballot_db::migrate(self.db.as_ref())
            .await
            .map_err(|e| AppError::InvalidPoll(e.to_string()))?;

        let vote_options = options_or_default(input.vote_options);
        let max_votes = clamp_max_votes(input.max_votes, vote_options.len());

        let creator_id = input.creator_id;
        let message = input.message;
        let secret = input.secret;
        let public = input.public;
        let options = vote_options;

        let id = self
            .db
            .transaction::<_, i64, DbErr>(move |txn| {
                Box::pin(async move {
                    let row = poll::ActiveModel {
                        id: NotSet,
                        creator_id: Set(creator_id),
                        message: Set(message),
                        finished: Set(false),
                        secret: Set(secret),
                        public: Set(public),
                        max_votes: Set(max_votes),
                    }
                    .insert(txn)
                    .await?;

                    let rows =
                        options
                            .into_iter()
                            .enumerate()
                            .map(|(number, name)| vote_option::ActiveModel {
                                poll_id: Set(row.id),
                                number: Set(number as i32),
                                name: Set(name),
                            });
                    // Composite-key rows cannot round-trip last_insert_id
                    VoteOption::insert_many(rows).exec_without_returning(txn).await?;

                    Ok(row.id)
                })
            })
            .await
            .map_err(|e| AppError::InvalidPoll(e.to_string()))?;

        debug!(poll_id = id, "created poll");
        self.load(id).await
    }

    /// Load a poll from the store.
    ///
    /// A missing poll row, an empty option list, and a store failure are all
    /// reported as [`AppError::InvalidPoll`].
    pub async fn load(&self, id: i64) -> AppResult<Poll> {
        let options = self
            .poll_repo
            .options(id)
            .await
            .map_err(|e| AppError::InvalidPoll(e.to_string()))?;
        if options.is_empty() {
            return Err(AppError::InvalidPoll(format!("poll not found: {id}")));
        }

        let row = match self.poll_repo.find_by_id(id).await {
            Ok(Some(row)) => row,
            Ok(None) => return Err(AppError::InvalidPoll(format!("poll not found: {id}"))),
            Err(e) => return Err(AppError::InvalidPoll(e.to_string())),
        };

        Ok(Poll {
            db: self.db.clone(),
            poll_repo: self.poll_repo.clone(),
            vote_repo: self.vote_repo.clone(),
            id,
            creator_id: row.creator_id,
            message: row.message,
            vote_options: options.into_iter().map(|o| o.name).collect(),
            secret: row.secret,
            public: row.public,
            max_votes: row.max_votes,
        })
    }
}

impl Poll {
    /// Unique poll identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// User who created the poll.
    #[must_use]
    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    /// Poll message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Option labels, ordered by option index.
    #[must_use]
    pub fn vote_options(&self) -> &[String] {
        &self.vote_options
    }

    /// Whether counts should stay hidden until the poll ends. Advisory only.
    #[must_use]
    pub const fn secret(&self) -> bool {
        self.secret
    }

    /// Whether voter identities may be revealed at the end. Advisory only.
    #[must_use]
    pub const fn public(&self) -> bool {
        self.public
    }

    /// Number of distinct options each voter may hold at once.
    #[must_use]
    pub const fn max_votes(&self) -> i32 {
        self.max_votes
    }

    /// Place or toggle a vote for the given user.
    ///
    /// Voting on a finished poll is silently ignored. An option index outside
    /// the option list is [`AppError::OptionOutOfRange`]. Voting an option
    /// the user already holds removes that vote. Casting beyond `max_votes`
    /// overwrites the previous choice when `max_votes == 1` and is
    /// [`AppError::NoMoreVotes`] otherwise.
    pub async fn vote(&self, voter_id: &str, option_index: i32) -> AppResult<()> {
        if self.is_finished().await? {
            debug!(poll_id = self.id, voter = voter_id, "vote after finish ignored");
            return Ok(());
        }
        if option_index < 0 || option_index as usize >= self.vote_options.len() {
            return Err(AppError::OptionOutOfRange(option_index));
        }

        let poll_id = self.id;
        let voter = voter_id.to_string();

        self.db
            .transaction::<_, (), AppError>(move |txn| {
                Box::pin(async move { apply_vote(txn, poll_id, &voter, option_index).await })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(err) => AppError::Database(err.to_string()),
                TransactionError::Transaction(err) => err,
            })
    }

    /// End the poll. Idempotent; there is no way to reopen a finished poll.
    pub async fn end(&self) -> AppResult<()> {
        self.poll_repo.mark_finished(self.id).await?;
        debug!(poll_id = self.id, "poll finished");
        Ok(())
    }

    /// Whether the poll is finished, read fresh from the store.
    pub async fn is_finished(&self) -> AppResult<bool> {
        self.poll_repo.is_finished(self.id).await
    }

    /// Total number of votes cast (not deduplicated by voter).
    pub async fn num_votes(&self) -> AppResult<u64> {
        self.vote_repo.count_all(self.id).await
    }

    /// Number of distinct users holding at least one vote.
    pub async fn num_voters(&self) -> AppResult<u64> {
        self.vote_repo.count_voters(self.id).await
    }

    /// Number of votes for the given option; 0 for an unknown option index.
    pub async fn count_votes(&self, option_index: i32) -> AppResult<u64> {
        self.vote_repo.count_for_option(self.id, option_index).await
    }

    /// Voters currently holding a vote for the given option.
    pub async fn voters(&self, option_index: i32) -> AppResult<Vec<String>> {
        self.vote_repo.voters(self.id, option_index).await
    }

    /// Option indices the given user currently holds a vote for.
    pub async fn votes(&self, voter_id: &str) -> AppResult<Vec<i32>> {
        self.vote_repo.voted_options(self.id, voter_id).await
    }
}

/// The vote state machine, applied inside one transaction.
async fn apply_vote(
    txn: &DatabaseTransaction,
    poll_id: i64,
    voter_id: &str,
    option_index: i32,
) -> AppResult<()> {
    // Re-read the poll row inside the transaction. On Postgres take a row
    // lock so concurrent votes on the same poll serialize here; SQLite
    // serializes writers on its own and rejects the lock clause.
    let mut query = PollRow::find_by_id(poll_id);
    if txn.get_database_backend() == DbBackend::Postgres {
        query = query.lock_exclusive();
    }
    let row = query
        .one(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::InvalidPoll(format!("poll not found: {poll_id}")))?;

    // A concurrent end() may have landed after the unlocked pre-check.
    if row.finished {
        return Ok(());
    }

    let held: Vec<i32> = PollVote::find()
        .filter(poll_vote::Column::PollId.eq(poll_id))
        .filter(poll_vote::Column::VoterId.eq(voter_id))
        .all(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .into_iter()
        .map(|v| v.option_index)
        .collect();

    if held.contains(&option_index) {
        // Toggle: voting an already-held option removes it.
        PollVote::delete_many()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .filter(poll_vote::Column::VoterId.eq(voter_id))
            .filter(poll_vote::Column::OptionIndex.eq(option_index))
            .exec(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        debug!(poll_id, voter = voter_id, option_index, "vote removed");
        return Ok(());
    }

    if held.len() as i32 >= row.max_votes {
        if row.max_votes == 1 {
            // Single-choice polls overwrite the previous choice silently.
            PollVote::delete_many()
                .filter(poll_vote::Column::PollId.eq(poll_id))
                .filter(poll_vote::Column::VoterId.eq(voter_id))
                .exec(txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        } else {
            return Err(AppError::NoMoreVotes);
        }
    }

    PollVote::insert(poll_vote::ActiveModel {
        poll_id: Set(poll_id),
        voter_id: Set(voter_id.to_string()),
        option_index: Set(option_index),
    })
    // Duplicate (poll, voter, option) rows are absorbed, not errors.
    .on_conflict(
        OnConflict::columns([
            poll_vote::Column::PollId,
            poll_vote::Column::VoterId,
            poll_vote::Column::OptionIndex,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(txn)
    .await
    .map_err(|e| AppError::Database(e.to_string()))?;
    debug!(poll_id, voter = voter_id, option_index, "vote recorded");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_default_to_yes_no() {
        let options = options_or_default(Vec::new());
        assert_eq!(options, vec!["Yes".to_string(), "No".to_string()]);

        let options = options_or_default(vec!["A".to_string()]);
        assert_eq!(options, vec!["A".to_string()]);
    }

    #[test]
    fn max_votes_clamped_to_option_count() {
        assert_eq!(clamp_max_votes(5, 2), 2);
        assert_eq!(clamp_max_votes(0, 2), 1);
        assert_eq!(clamp_max_votes(-3, 4), 1);
        assert_eq!(clamp_max_votes(2, 3), 2);
    }

    #[test]
    fn input_defaults_are_single_choice() {
        let input = CreatePollInput::new("alice", "Lunch?");
        assert!(input.vote_options.is_empty());
        assert_eq!(input.max_votes, 1);
        assert!(!input.secret);
        assert!(!input.public);
    }
}
