//! Business logic services.

#![allow(missing_docs)]

pub mod poll;

pub use poll::{CreatePollInput, Poll, PollService};
