//! Create poll vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PollVote::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PollVote::PollId).big_integer().not_null())
                    .col(ColumnDef::new(PollVote::VoterId).string().not_null())
                    .col(ColumnDef::new(PollVote::OptionIndex).integer().not_null())
                    // Composite key: at most one row per (poll, voter, option)
                    .primary_key(
                        Index::create()
                            .col(PollVote::PollId)
                            .col(PollVote::VoterId)
                            .col(PollVote::OptionIndex),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_vote_poll")
                            .from(PollVote::Table, PollVote::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (poll_id, voter_id) (for a voter's current option set)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_poll_voter")
                    .table(PollVote::Table)
                    .col(PollVote::PollId)
                    .col(PollVote::VoterId)
                    .to_owned(),
            )
            .await?;

        // Index: (poll_id, option_index) (for per-option tallies)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_poll_option")
                    .table(PollVote::Table)
                    .col(PollVote::PollId)
                    .col(PollVote::OptionIndex)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PollVote {
    Table,
    PollId,
    VoterId,
    OptionIndex,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}
