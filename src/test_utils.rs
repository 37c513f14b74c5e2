use crate::db::{self, DbPool};
use crate::models::{NewPost, Post, User, Visibility};
use crate::repo;
use crate::run_migrations;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

/// Password used for every account the tests create
pub const TEST_PASSWORD: &str = "correct horse battery";

/// Sets up a test database with migrations applied
///
/// ### Returns
///
/// An Arc-wrapped pool connected to a fresh in-memory database
pub fn setup_test_db() -> Arc<DbPool> {
    // Plain ":memory:" gives each pooled connection its own database, so a
    // unique shared-cache URI keeps one schema per test.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to build pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");
    drop(conn);

    Arc::new(pool)
}

/// Creates a user with [`TEST_PASSWORD`]
pub fn create_test_user(pool: &DbPool, username: &str) -> User {
    repo::create_user(pool, username, &format!("{username}@example.com"), TEST_PASSWORD)
        .expect("Failed to create user")
}

/// A fixed point in time; `minutes` later gives a strictly newer post
pub fn test_time(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
}

/// Creates a post at `test_time(minutes)` with the given tags
pub fn create_test_post(
    pool: &DbPool,
    author: &User,
    visibility: Visibility,
    title: &str,
    tags: &[&str],
    minutes: i64,
) -> Post {
    let new_post = NewPost::new(
        author.get_id(),
        visibility,
        title.to_string(),
        format!("Content of {title}"),
        None,
    )
    .posted_at(test_time(minutes));
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    repo::create_post(pool, new_post, &tags).expect("Failed to create post")
}

/// Generates a tag name without commas, quotes or surrounding whitespace
pub fn arb_tag_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 _.-]{0,15}[a-zA-Z0-9]|[a-zA-Z0-9]"
}

/// Generates strings with spaces, quotes, commas and non-ASCII text
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{0,12}",
        "[ \t,\"a-zA-Z0-9]{0,24}",
        "\\PC{0,16}",
    ]
}

/// Generates a visibility
pub fn arb_visibility() -> impl Strategy<Value = Visibility> {
    prop_oneof![Just(Visibility::Public), Just(Visibility::Private)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::Text;
    use diesel::{QueryableByName, RunQueryDsl};

    #[derive(QueryableByName, Debug)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[test]
    fn test_setup_test_db() {
        let pool = setup_test_db();
        let mut conn = pool.get().unwrap();

        let table_names: Vec<TableName> =
            diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
                .load(&mut conn)
                .expect("Failed to load table names");

        for table in ["users", "sessions", "posts", "tags", "post_tags", "__diesel_schema_migrations"] {
            assert!(
                table_names.iter().any(|t| t.name == table),
                "Table '{}' not found in database",
                table
            );
        }
    }

    #[test]
    fn test_databases_are_isolated() {
        let first = setup_test_db();
        let second = setup_test_db();
        create_test_user(&first, "alice");

        assert_eq!(repo::count_users(&first).unwrap(), 1);
        assert_eq!(repo::count_users(&second).unwrap(), 0);
    }
}
