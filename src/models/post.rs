use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{User, Visibility};

/// Maximum length of a post title
pub const TITLE_MAX_LENGTH: usize = 100;

/// Represents a blog entry
///
/// Public and private posts share this shape; the `visibility` column
/// decides which set of views may show the post. The image column holds a
/// path relative to the media directory, or the empty string when the post
/// has no image.
#[derive(Queryable, Selectable, Identifiable, Associations, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(belongs_to(User, foreign_key = author_id))]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Post {
    id: i32,
    author_id: i32,
    visibility: Visibility,
    date_posted: NaiveDateTime,
    title: String,
    content: String,
    image: String,
}

impl Post {
    /// Creates a post with all fields specified
    ///
    /// Used by tests and by callers that already hold a database row.
    pub fn new_with_fields(
        id: i32,
        author_id: i32,
        visibility: Visibility,
        date_posted: DateTime<Utc>,
        title: String,
        content: String,
        image: Option<String>,
    ) -> Self {
        Self {
            id,
            author_id,
            visibility,
            date_posted: date_posted.naive_utc(),
            title,
            content,
            image: image.unwrap_or_default(),
        }
    }

    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_author_id(&self) -> i32 {
        self.author_id
    }

    pub fn get_visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn get_date_posted(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.date_posted, Utc)
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_content(&self) -> String {
        self.content.clone()
    }

    /// Media-relative image path, if the post has one
    pub fn get_image(&self) -> Option<String> {
        if self.image.is_empty() {
            None
        } else {
            Some(self.image.clone())
        }
    }

    /// Canonical URL of the post's detail page
    pub fn get_absolute_url(&self) -> String {
        format!("{}/post/{}/", self.visibility.url_prefix(), self.id)
    }
}

/// Insertable form of [`Post`]
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub author_id: i32,
    pub visibility: Visibility,
    pub date_posted: NaiveDateTime,
    pub title: String,
    pub content: String,
    pub image: String,
}

impl NewPost {
    /// Creates a post stamped with the current time
    pub fn new(
        author_id: i32,
        visibility: Visibility,
        title: String,
        content: String,
        image: Option<String>,
    ) -> Self {
        Self {
            author_id,
            visibility,
            date_posted: Utc::now().naive_utc(),
            title,
            content,
            image: image.unwrap_or_default(),
        }
    }

    /// Overrides the posting time
    pub fn posted_at(mut self, date_posted: DateTime<Utc>) -> Self {
        self.date_posted = date_posted.naive_utc();
        self
    }
}

/// A post together with the data every listing needs to render it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSummary {
    pub post: Post,
    pub author: String,
    pub tags: Vec<super::Tag>,
}
