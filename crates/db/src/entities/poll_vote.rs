//! Poll vote entity — one ledger entry per (poll, voter, option).
//!
//! The composite primary key is the "at most one row per
//! (poll, voter, option)" uniqueness constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll_vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub poll_id: i64,

    /// User who cast the vote.
    #[sea_orm(primary_key, auto_increment = false)]
    pub voter_id: String,

    /// 0-based index into the poll's option list.
    #[sea_orm(primary_key, auto_increment = false)]
    pub option_index: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
