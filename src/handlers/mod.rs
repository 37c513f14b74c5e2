/// Web Handlers
///
/// This module contains the handlers for every page of the blog.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository functions,
/// and returning rendered HTML or a redirect.

/// Helpers used by both the public and the private post handlers
mod shared;
mod post_handlers;
mod private_post_handlers;
mod listing_handlers;
mod search_handlers;
mod page_handlers;
mod auth_handlers;

// Re-export all handlers
pub use post_handlers::*;
pub use private_post_handlers::*;
pub use listing_handlers::*;
pub use search_handlers::*;
pub use page_handlers::*;
pub use auth_handlers::*;
