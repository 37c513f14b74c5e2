use crate::auth::{hash_password, verify_password};
use crate::db::DbPool;
use crate::models::{NewUser, User};
use crate::schema::users;
use anyhow::Result;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, info, instrument};

/// Creates a new account with a hashed password
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The username is already taken (UNIQUE constraint)
/// - Password hashing fails
#[instrument(skip(pool, email, password), fields(username = %username))]
pub fn create_user(pool: &DbPool, username: &str, email: &str, password: &str) -> Result<User> {
    debug!("Creating new user");

    let password_hash = hash_password(password)?;
    let new_user = NewUser::new(username.to_string(), email.to_string(), password_hash);

    let conn = &mut pool.get()?;
    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)?;

    info!("Created user {} with id {}", user.get_username(), user.get_id());
    Ok(user)
}

/// Whether `err` came from a UNIQUE constraint, e.g. a username taken
/// between checking for it and inserting
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}

/// Retrieves a user by id
#[instrument(skip(pool))]
pub fn get_user(pool: &DbPool, user_id: i32) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let user = users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?;
    Ok(user)
}

/// Retrieves a user by username (exact match)
#[instrument(skip(pool))]
pub fn get_user_by_username(pool: &DbPool, username: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let user = users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()?;

    if user.is_none() {
        debug!("No user named {}", username);
    }
    Ok(user)
}

/// Checks a username/password pair
///
/// ### Returns
///
/// The user when the credentials match, `None` for an unknown user or a
/// wrong password
#[instrument(skip(pool, password))]
pub fn authenticate(pool: &DbPool, username: &str, password: &str) -> Result<Option<User>> {
    let user = get_user_by_username(pool, username)?;
    Ok(user.filter(|u| verify_password(password, u.get_password_hash())))
}

/// Lists all users ordered by username
#[instrument(skip(pool))]
pub fn list_users(pool: &DbPool) -> Result<Vec<User>> {
    let conn = &mut pool.get()?;
    let result = users::table
        .order(users::username.asc())
        .select(User::as_select())
        .load(conn)?;
    Ok(result)
}

/// Deletes a user; their posts and sessions go with them
///
/// ### Returns
///
/// `true` if a user was deleted
#[instrument(skip(pool))]
pub fn delete_user(pool: &DbPool, user_id: i32) -> Result<bool> {
    let conn = &mut pool.get()?;
    let deleted = diesel::delete(users::table.find(user_id)).execute(conn)?;
    info!("Deleted {} user row(s)", deleted);
    Ok(deleted > 0)
}

#[instrument(skip(pool))]
pub fn count_users(pool: &DbPool) -> Result<i64> {
    let conn = &mut pool.get()?;
    Ok(users::table.count().get_result(conn)?)
}

#[cfg(test)]
mod tests;
