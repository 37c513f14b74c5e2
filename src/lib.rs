/// Blogpress: a blog with public and private posts
///
/// This library provides the data models, database access, HTML rendering
/// and HTTP routes of the blog. Members write posts that are either public
/// or visible only to themselves, tag them, and browse by author, by tag or
/// by keyword search.
///
/// ### Modules
///
/// - `db`: Database connection management
/// - `models`: Users, sessions, posts and tags
/// - `repo`: Repository layer for database operations
/// - `handlers`: HTTP handlers for every page
/// - `render`: HTML templates
/// - `auth`: Password hashing, session cookies and the login extractors
///
/// Use [`create_app`] to build the router and [`run_migrations`] to bring a
/// database up to date.

/// Database connection module
pub mod db;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Web handlers module
pub mod handlers;

/// Form and query string types
pub mod dto;

/// Error types and their HTTP responses
pub mod errors;

/// Configuration loading
pub mod config;

/// Accounts and login state
///
/// Passwords are stored as Argon2id PHC strings. A logged-in browser holds a
/// random session key in the `sessionid` cookie; the key resolves to a user
/// through the `sessions` table.
pub mod auth;

/// Tracing subscriber setup shared by the server and the admin tool
pub mod logging;

/// Storage of uploaded post images under the media directory
pub mod media;

/// Page arithmetic for list views
///
/// Every listing asks the repo for a total count, builds a `Paginator`,
/// resolves the raw `?page=` value to a `Page`, then fetches
/// `page.limit()` rows starting at `page.offset()`.
pub mod pagination;

/// Server-side HTML rendering
///
/// Pages are assembled from the templates under `src/html` by replacing
/// `<!--name-->` placeholders. Every value taken from the database or a
/// request is escaped before it is inserted.
pub mod render;

/// Aggregation tables for the tag and author listings
///
/// The repo returns grouped counts straight from SQL in no particular
/// order; the ordering shown to readers is applied here.
pub mod stats;

/// Tag input parsing
///
/// The post form carries tags as a single free-text field. Input containing
/// a comma is split on commas (so names may contain spaces); anything else
/// is split on whitespace. Double quotes group words in either mode.
pub mod tagging;

#[cfg(test)]
pub mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::get;
use axum::Router;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Largest accepted request body; post forms may carry an image
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Runs any migrations not yet applied to the database
pub fn run_migrations(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    if !applied.is_empty() {
        info!("Applied {} migration(s)", applied.len());
    }
    Ok(())
}

/// Site-wide settings the handlers need besides the database
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub media_dir: PathBuf,
    pub session_ttl: chrono::Duration,
}

impl SiteSettings {
    pub fn from_config(config: &config::Config) -> Self {
        Self {
            media_dir: PathBuf::from(&config.media_dir),
            session_ttl: config.session_ttl(),
        }
    }
}

/// Shared state of the router
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub settings: Arc<SiteSettings>,
}

impl AppState {
    pub fn new(pool: Arc<db::DbPool>, settings: SiteSettings) -> Self {
        Self {
            pool,
            settings: Arc::new(settings),
        }
    }
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<SiteSettings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - The database pool and site settings
///
/// ### Returns
///
/// An Axum router serving every page plus uploaded media under `/media`
pub fn create_app(state: AppState) -> Router {
    let media = ServeDir::new(&state.settings.media_dir);

    Router::new()
        // Public posts
        .route("/", get(handlers::home_handler))
        .route("/user/{username}", get(handlers::user_posts_handler))
        .route("/post/new/", get(handlers::new_post_form_handler).post(handlers::create_post_handler))
        .route("/post/{pk}/", get(handlers::post_detail_handler))
        .route(
            "/post/{pk}/update",
            get(handlers::edit_post_form_handler).post(handlers::update_post_handler),
        )
        .route(
            "/post/{pk}/delete",
            get(handlers::confirm_delete_handler).post(handlers::delete_post_handler),
        )
        .route("/tag/{pk}", get(handlers::tag_posts_handler))
        // Compact listings and aggregation tables
        .route("/list/", get(handlers::compact_list_handler))
        .route("/user_list/{username}", get(handlers::user_compact_list_handler))
        .route("/tag_list/{pk}", get(handlers::tag_compact_list_handler))
        .route("/tags/", get(handlers::tag_table_handler))
        .route("/authors/", get(handlers::author_table_handler))
        // Search
        .route("/search/", get(handlers::search_handler).post(handlers::search_submit_handler))
        // Private posts
        .route("/private/", get(handlers::private_home_handler))
        .route(
            "/private/post/new/",
            get(handlers::private_new_post_form_handler).post(handlers::private_create_post_handler),
        )
        .route("/private/post/{pk}/", get(handlers::private_post_detail_handler))
        .route(
            "/private/post/{pk}/update",
            get(handlers::private_edit_post_form_handler).post(handlers::private_update_post_handler),
        )
        .route(
            "/private/post/{pk}/delete",
            get(handlers::private_confirm_delete_handler).post(handlers::private_delete_post_handler),
        )
        .route("/private/tag/{pk}", get(handlers::private_tag_posts_handler))
        .route(
            "/private/search/",
            get(handlers::private_search_handler).post(handlers::private_search_submit_handler),
        )
        // Pages and accounts
        .route("/about/", get(handlers::about_handler))
        .route("/dashboard/", get(handlers::dashboard_handler))
        .route("/register/", get(handlers::register_form_handler).post(handlers::register_handler))
        .route("/login/", get(handlers::login_form_handler).post(handlers::login_handler))
        .route("/logout/", get(handlers::logout_handler).post(handlers::logout_handler))
        .nest_service("/media", media)
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
