//! Create vote option table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VoteOption::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VoteOption::PollId).big_integer().not_null())
                    .col(ColumnDef::new(VoteOption::Number).integer().not_null())
                    .col(ColumnDef::new(VoteOption::Name).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(VoteOption::PollId)
                            .col(VoteOption::Number),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_option_poll")
                            .from(VoteOption::Table, VoteOption::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: poll_id (for loading a poll's option list)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_option_poll_id")
                    .table(VoteOption::Table)
                    .col(VoteOption::PollId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteOption::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VoteOption {
    Table,
    PollId,
    Number,
    Name,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}
