/// Data models module
///
/// Database models that map to the tables in `schema`, the insertable
/// counterparts for rows whose ids SQLite assigns, and the small value types
/// stored alongside them.

mod visibility;
pub use visibility::Visibility;

mod user;
pub use user::{NewUser, User};

mod session;
pub use session::{generate_session_key, Session, MAX_SESSION_TTL_HOURS, SESSION_KEY_LENGTH};

mod post;
pub use post::{NewPost, Post, PostSummary, TITLE_MAX_LENGTH};

mod tag;
pub use tag::{NewTag, Tag, TAG_NAME_MAX_LENGTH};

mod post_tag;
pub use post_tag::PostTag;
