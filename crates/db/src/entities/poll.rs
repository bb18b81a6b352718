//! Poll entity.
//!
//! One row per poll. Everything except `finished` is immutable after insert;
//! `finished` flips false to true exactly once and never reverts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// User who created the poll.
    pub creator_id: String,

    /// Poll message (may contain markup).
    pub message: String,

    /// Whether voting is closed.
    pub finished: bool,

    /// A secret poll does not reveal counts until it is finished.
    /// Advisory to presentation layers; the store does not gate queries on it.
    pub secret: bool,

    /// A public poll reveals who voted for what at the end.
    /// Advisory, like `secret`.
    pub public: bool,

    /// Number of distinct options each voter may hold at once.
    pub max_votes: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vote_option::Entity")]
    VoteOption,

    #[sea_orm(has_many = "super::poll_vote::Entity")]
    PollVote,
}

impl Related<super::vote_option::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteOption.def()
    }
}

impl Related<super::poll_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PollVote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
