//! Repositories for database operations.

pub mod poll;
pub mod poll_vote;

pub use poll::PollRepository;
pub use poll_vote::PollVoteRepository;
