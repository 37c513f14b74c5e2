use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum length of a tag name
pub const TAG_NAME_MAX_LENGTH: usize = 100;

/// Represents a label attached to posts
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::tags)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tag {
    id: i32,
    name: String,
}

impl Tag {
    pub fn new_with_fields(id: i32, name: String) -> Self {
        Self { id, name }
    }

    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::tags)]
pub struct NewTag {
    pub name: String,
}
