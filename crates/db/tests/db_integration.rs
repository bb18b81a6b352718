//! Database integration tests.
//!
//! The schema tests run against in-memory SQLite and need no external
//! services. The `PostgreSQL` tests require a running instance and are
//! ignored by default; run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables for the Postgres tests:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `ballot_test`)
//!   `TEST_DB_PASSWORD` (default: `ballot_test`)
//!   `TEST_DB_NAME` (default: `ballot_test`)

#![allow(clippy::unwrap_used)]

use ballot_common::config::{Config, DatabaseConfig};
use ballot_db::entities::{poll, poll_vote, vote_option, Poll, PollVote, VoteOption};
use ballot_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    ModelTrait, NotSet, PaginatorTrait, QueryFilter, Set,
};

async fn sqlite_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    ballot_db::migrate(&db).await.unwrap();
    db
}

async fn insert_poll(db: &DatabaseConnection, max_votes: i32) -> poll::Model {
    let row = poll::ActiveModel {
        id: NotSet,
        creator_id: Set("alice".to_string()),
        message: Set("Lunch?".to_string()),
        finished: Set(false),
        secret: Set(false),
        public: Set(false),
        max_votes: Set(max_votes),
    }
    .insert(db)
    .await
    .unwrap();

    for (number, name) in ["Pizza", "Sushi"].iter().enumerate() {
        VoteOption::insert(vote_option::ActiveModel {
            poll_id: Set(row.id),
            number: Set(number as i32),
            name: Set((*name).to_string()),
        })
        .exec_without_returning(db)
        .await
        .unwrap();
    }
    row
}

#[tokio::test]
async fn init_from_config_connects_and_migrates() {
    let config = Config {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            // One connection so every statement sees the same in-memory file
            max_connections: 1,
            min_connections: 1,
        },
    };

    let db = ballot_db::init(&config).await.unwrap();
    ballot_db::migrate(&db).await.unwrap();

    let created = insert_poll(&db, 1).await;
    assert!(Poll::find_by_id(created.id).one(&db).await.unwrap().is_some());
}

#[tokio::test]
async fn migrations_apply_twice() {
    let db = sqlite_db().await;
    // Second run must be a no-op
    ballot_db::migrate(&db).await.unwrap();
}

#[tokio::test]
async fn poll_roundtrip() {
    let db = sqlite_db().await;
    let created = insert_poll(&db, 2).await;

    let loaded = Poll::find_by_id(created.id).one(&db).await.unwrap().unwrap();
    assert_eq!(loaded.creator_id, "alice");
    assert_eq!(loaded.max_votes, 2);
    assert!(!loaded.finished);

    let options = VoteOption::find()
        .filter(vote_option::Column::PollId.eq(created.id))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(options.len(), 2);
}

#[tokio::test]
async fn duplicate_vote_row_is_rejected_by_key() {
    let db = sqlite_db().await;
    let created = insert_poll(&db, 1).await;

    PollVote::insert(poll_vote::ActiveModel {
        poll_id: Set(created.id),
        voter_id: Set("bob".to_string()),
        option_index: Set(0),
    })
    .exec_without_returning(&db)
    .await
    .unwrap();

    let dup = PollVote::insert(poll_vote::ActiveModel {
        poll_id: Set(created.id),
        voter_id: Set("bob".to_string()),
        option_index: Set(0),
    })
    .exec_without_returning(&db)
    .await;
    assert!(dup.is_err());
}

#[tokio::test]
async fn deleting_poll_cascades_to_children() {
    let db = sqlite_db().await;
    let created = insert_poll(&db, 1).await;

    PollVote::insert(poll_vote::ActiveModel {
        poll_id: Set(created.id),
        voter_id: Set("bob".to_string()),
        option_index: Set(1),
    })
    .exec_without_returning(&db)
    .await
    .unwrap();

    created.clone().delete(&db).await.unwrap();

    let votes = PollVote::find()
        .filter(poll_vote::Column::PollId.eq(created.id))
        .count(&db)
        .await
        .unwrap();
    let options = VoteOption::find()
        .filter(vote_option::Column::PollId.eq(created.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(votes, 0);
    assert_eq!(options, 0);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn postgres_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn postgres_migrate_and_cleanup() {
    let db = TestDatabase::new().await.unwrap();
    ballot_db::migrate(db.connection()).await.unwrap();
    db.cleanup().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
