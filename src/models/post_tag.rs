use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Post, Tag};

/// Represents an association between a post and a tag
#[derive(Queryable, Selectable, Insertable, Identifiable, Associations, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(belongs_to(Post))]
#[diesel(belongs_to(Tag))]
#[diesel(primary_key(post_id, tag_id))]
#[diesel(table_name = crate::schema::post_tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PostTag {
    post_id: i32,
    tag_id: i32,
}

impl PostTag {
    pub fn new(post_id: i32, tag_id: i32) -> Self {
        Self { post_id, tag_id }
    }

    pub fn get_post_id(&self) -> i32 {
        self.post_id
    }

    pub fn get_tag_id(&self) -> i32 {
        self.tag_id
    }
}
