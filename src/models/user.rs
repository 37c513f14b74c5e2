use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Represents an account that can author posts
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Database-assigned identifier
    id: i32,

    /// Unique login name, also used in author URLs
    username: String,

    /// Contact address (may be empty)
    email: String,

    /// Argon2 PHC string; never serialized
    #[serde(skip_serializing, default)]
    password_hash: String,

    /// When the account was created
    date_joined: NaiveDateTime,
}

impl User {
    /// Creates a user with all fields specified
    pub fn new_with_fields(
        id: i32,
        username: String,
        email: String,
        password_hash: String,
        date_joined: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            password_hash,
            date_joined: date_joined.naive_utc(),
        }
    }

    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_username(&self) -> String {
        self.username.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_date_joined(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.date_joined, Utc)
    }
}

/// Insertable form of [`User`]; the id is assigned by SQLite
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub date_joined: NaiveDateTime,
}

impl NewUser {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
            date_joined: Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_not_serialized() {
        let user = User::new_with_fields(
            1,
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$secret".to_string(),
            Utc::now(),
        );

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_new_user_timestamp_is_recent() {
        let new_user = NewUser::new("bob".to_string(), String::new(), "hash".to_string());
        let diff = Utc::now().naive_utc() - new_user.date_joined;
        assert!(diff.num_seconds() < 1);
    }
}
