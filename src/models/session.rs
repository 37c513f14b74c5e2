use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of a generated session key
pub const SESSION_KEY_LENGTH: usize = 32;

/// Longest a session may last, in hours (a century)
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 100;

/// Server-side login state, keyed by the value of the `sessionid` cookie
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    session_key: String,
    user_id: i32,
    expire_date: NaiveDateTime,
}

impl Session {
    /// Opens a new session for `user_id` that lasts `ttl`, capped at
    /// [`MAX_SESSION_TTL_HOURS`]
    pub fn new(user_id: i32, ttl: Duration) -> Self {
        let ttl = ttl.min(Duration::hours(MAX_SESSION_TTL_HOURS));
        let expire_date = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            session_key: generate_session_key(),
            user_id,
            expire_date: expire_date.naive_utc(),
        }
    }

    pub fn get_session_key(&self) -> String {
        self.session_key.clone()
    }

    pub fn get_user_id(&self) -> i32 {
        self.user_id
    }

    pub fn get_expire_date(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.expire_date, Utc)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.get_expire_date() <= now
    }
}

/// Random lowercase alphanumeric key
pub fn generate_session_key() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_KEY_LENGTH)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
