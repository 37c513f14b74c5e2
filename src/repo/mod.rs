/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for creating, retrieving, updating and deleting
/// users, sessions, posts and tags, plus the grouped counts behind the
/// listing tables.
///
/// The repository pattern abstracts away the details of database access
/// and provides a clean API for the rest of the application to use.

mod user_repo;
mod session_repo;
mod post_repo;
mod tag_repo;
mod stats_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use session_repo::*;
pub use post_repo::*;
pub use tag_repo::*;
pub use stats_repo::*;
