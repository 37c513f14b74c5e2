use crate::db::DbPool;
use crate::models::{Session, User};
use crate::schema::{sessions, users};
use anyhow::Result;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Opens a session for a user
#[instrument(skip(pool))]
pub fn create_session(pool: &DbPool, user_id: i32, ttl: Duration) -> Result<Session> {
    let conn = &mut pool.get()?;
    let session = Session::new(user_id, ttl);

    diesel::insert_into(sessions::table)
        .values(&session)
        .execute(conn)?;

    debug!("Opened session for user {}", user_id);
    Ok(session)
}

/// Resolves a session key to its user
///
/// An expired session is deleted and reads as no session.
#[instrument(skip(pool, session_key))]
pub fn get_session_user(pool: &DbPool, session_key: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let row = sessions::table
        .inner_join(users::table)
        .filter(sessions::session_key.eq(session_key))
        .select((Session::as_select(), User::as_select()))
        .first::<(Session, User)>(conn)
        .optional()?;

    match row {
        Some((session, _)) if session.is_expired_at(Utc::now()) => {
            debug!("Session expired, removing it");
            diesel::delete(sessions::table.find(session_key)).execute(conn)?;
            Ok(None)
        }
        Some((_, user)) => Ok(Some(user)),
        None => Ok(None),
    }
}

/// Ends a session; unknown keys are ignored
#[instrument(skip(pool, session_key))]
pub fn delete_session(pool: &DbPool, session_key: &str) -> Result<()> {
    let conn = &mut pool.get()?;
    diesel::delete(sessions::table.find(session_key)).execute(conn)?;
    Ok(())
}

/// Removes every session past its expiry date
///
/// ### Returns
///
/// The number of sessions removed
#[instrument(skip(pool))]
pub fn purge_expired_sessions(pool: &DbPool) -> Result<usize> {
    let conn = &mut pool.get()?;
    let removed = diesel::delete(sessions::table.filter(sessions::expire_date.le(Utc::now().naive_utc())))
        .execute(conn)?;
    info!("Purged {} expired session(s)", removed);
    Ok(removed)
}
