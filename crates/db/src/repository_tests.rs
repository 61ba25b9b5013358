//! Repository tests against an in-memory SQLite database.
//!
//! The pool is capped at one connection so every session sees the same
//! in-memory database; the fixture creates the table the way an existing
//! deployment would already have it.

use crate::models::{User, UserCreate, UserQuery, UserRepository, UserUpdate};
use crate::pool::{create_pool, DbPool};
use crate::{CrudError, DbError, Model, Repository};

/// A model whose table does not exist in the fixture database.
#[derive(Debug, sqlx::FromRow)]
struct Archived {
    id: i64,
}

impl Model for Archived {
    const TABLE: &'static str = "archived_users";

    fn id(&self) -> i64 {
        self.id
    }
}

async fn users_pool() -> DbPool {
    let pool = create_pool("sqlite::memory:", 1).await.expect("in-memory pool");
    sqlx::query(
        "CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE
        )",
    )
    .execute(&pool)
    .await
    .expect("users table");
    pool
}

async fn repo(pool: &DbPool) -> UserRepository {
    UserRepository::new(pool.acquire().await.expect("session"), "alice")
}

fn new_user(name: &str, email: Option<&str>) -> UserCreate {
    UserCreate {
        name: name.to_string(),
        email: email.map(str::to_string),
    }
}

// ============================================================
// create / read_by_id / delete
// ============================================================

#[tokio::test]
async fn create_read_delete_lifecycle() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    let created = repo.create(&new_user("x", None)).await.expect("row created");
    assert_eq!(created, User { id: 1, name: "x".into(), email: None });

    let read = repo.read_by_id(1).await.unwrap();
    assert_eq!(read, Some(created.clone()));

    let deleted = repo.delete(1).await.unwrap();
    assert_eq!(deleted, Some(created));

    assert_eq!(repo.read_by_id(1).await.unwrap(), None);
}

#[tokio::test]
async fn create_persists_every_input_field() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    let created = repo.create(&new_user("ada", Some("ada@example.com"))).await.unwrap();
    let read = repo.read_by_id(created.id).await.unwrap().unwrap();

    assert_eq!(read.name, "ada");
    assert_eq!(read.email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn failed_create_returns_none_and_leaves_no_row() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    repo.create(&new_user("first", Some("dup@example.com"))).await.unwrap();
    let second = repo.create(&new_user("second", Some("dup@example.com"))).await;
    assert!(second.is_none());

    let all = repo.read_optional(&UserQuery::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "first");

    assert_eq!(repo.create_error().status(), 409);
}

#[tokio::test]
async fn read_and_delete_of_missing_id_are_absent_not_errors() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    assert_eq!(repo.read_by_id(42).await.unwrap(), None);
    assert_eq!(repo.delete(42).await.unwrap(), None);
}

// ============================================================
// read_optional
// ============================================================

#[tokio::test]
async fn empty_query_returns_all_rows_ascending() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    for name in ["c", "a", "b"] {
        repo.create(&new_user(name, None)).await.unwrap();
    }

    let rows = repo.read_optional(&UserQuery::default()).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|u| u.id).collect();
    let names: Vec<&str> = rows.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn query_filters_only_on_set_fields() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    repo.create(&new_user("sam", Some("sam@one.com"))).await.unwrap();
    repo.create(&new_user("sam", None)).await.unwrap();
    repo.create(&new_user("kim", Some("kim@two.com"))).await.unwrap();

    let by_name = repo
        .read_optional(&UserQuery { name: Some("sam".into()), email: None })
        .await
        .unwrap();
    assert_eq!(by_name.iter().map(|u| u.id).collect::<Vec<_>>(), vec![1, 2]);

    let null_email = repo
        .read_optional(&UserQuery { name: None, email: Some(None) })
        .await
        .unwrap();
    assert_eq!(null_email.iter().map(|u| u.id).collect::<Vec<_>>(), vec![2]);

    let both = repo
        .read_optional(&UserQuery {
            name: Some("sam".into()),
            email: Some(Some("sam@one.com".into())),
        })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].id, 1);
}

#[tokio::test]
async fn query_without_matches_is_an_empty_list() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;

    repo.create(&new_user("sam", None)).await.unwrap();

    let rows = repo
        .read_optional(&UserQuery { name: Some("nobody".into()), email: None })
        .await
        .unwrap();
    assert!(rows.is_empty());
}

// ============================================================
// update
// ============================================================

#[tokio::test]
async fn update_changes_only_present_fields() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;
    let created = repo.create(&new_user("old", Some("keep@example.com"))).await.unwrap();

    let patch = UserUpdate { name: Some("new".into()), email: None };
    let updated = repo.update(created.id, &patch).await.unwrap();
    assert_eq!(updated.name, "new");
    assert_eq!(updated.email.as_deref(), Some("keep@example.com"));

    let patch = UserUpdate { name: None, email: Some(None) };
    let updated = repo.update(created.id, &patch).await.unwrap();
    assert_eq!(updated.name, "new");
    assert_eq!(updated.email, None);

    assert_eq!(repo.read_by_id(created.id).await.unwrap(), Some(updated));
}

#[tokio::test]
async fn empty_patch_returns_row_unchanged() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;
    let created = repo.create(&new_user("same", None)).await.unwrap();

    let updated = repo.update(created.id, &UserUpdate::default()).await.unwrap();
    assert_eq!(updated, created);
}

#[tokio::test]
async fn update_of_missing_id_fails_with_that_id() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;
    repo.create(&new_user("only", None)).await.unwrap();

    let err = repo
        .update(99, &UserUpdate { name: Some("ghost".into()), email: None })
        .await
        .unwrap_err();

    match err {
        CrudError::Update { username, id, cause } => {
            assert_eq!(username, "alice");
            assert_eq!(id, 99);
            assert!(cause.is_none());
        }
        other => panic!("expected update error, got {other:?}"),
    }

    let rows = repo.read_optional(&UserQuery::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "only");
}

#[tokio::test]
async fn failed_update_rolls_back_and_carries_cause() {
    let pool = users_pool().await;
    let mut repo = repo(&pool).await;
    repo.create(&new_user("a", Some("a@example.com"))).await.unwrap();
    let b = repo.create(&new_user("b", Some("b@example.com"))).await.unwrap();

    let patch = UserUpdate {
        name: Some("renamed".into()),
        email: Some(Some("a@example.com".into())),
    };
    let err = repo.update(b.id, &patch).await.unwrap_err();

    assert!(matches!(&err, CrudError::Update { id, cause: Some(_), .. } if *id == b.id));
    assert_eq!(err.status(), 409);

    // the statement's own failure is reported, not a later rollback outcome
    match &err {
        CrudError::Update { cause: Some(DbError::Sqlx(cause)), .. } => {
            assert!(cause.to_string().contains("UNIQUE"), "unexpected cause: {cause}");
        }
        other => panic!("expected sqlx cause, got {other:?}"),
    }

    assert_eq!(repo.read_by_id(b.id).await.unwrap(), Some(b));
}

// ============================================================
// storage and delete failures
// ============================================================

#[tokio::test]
async fn read_of_missing_table_is_a_storage_error() {
    let pool = users_pool().await;
    let mut repo: Repository<Archived, UserCreate, UserUpdate, UserQuery> =
        Repository::new(pool.acquire().await.unwrap(), "alice");

    let err = repo.read_by_id(1).await.unwrap_err();
    assert!(matches!(&err, CrudError::Storage { username, .. } if username == "alice"));
    assert_eq!(err.status(), 500);

    let err = repo.read_optional(&UserQuery::default()).await.unwrap_err();
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn failed_delete_is_a_conflict_and_keeps_the_row() {
    let pool = users_pool().await;
    sqlx::query(
        "CREATE TRIGGER users_locked BEFORE DELETE ON users
         BEGIN SELECT RAISE(ABORT, 'users are locked'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    let mut repo = repo(&pool).await;
    let created = repo.create(&new_user("kept", None)).await.unwrap();

    let err = repo.delete(created.id).await.unwrap_err();
    assert!(matches!(&err, CrudError::Delete { id, cause: Some(_), .. } if *id == created.id));
    assert_eq!(err.status(), 409);
    assert_eq!(err.username(), "alice");

    assert_eq!(repo.read_by_id(created.id).await.unwrap(), Some(created));
}
