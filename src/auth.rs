use std::sync::Arc;

use anyhow::anyhow;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::User;
use crate::repo;

/// Name of the cookie carrying the session key
pub const SESSION_COOKIE: &str = "sessionid";

/// Hashes a password with a fresh random salt
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored hash
///
/// A malformed hash never verifies.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// The cookie that logs a browser in
pub fn session_cookie(session_key: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_key))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// A cookie matching [`session_cookie`]'s path, for removal from a jar
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Accepts a post-login redirect target only if it stays on this site
///
/// Absolute URLs and protocol-relative `//host` paths fall back to `/`.
/// Browsers drop tabs and line breaks from URLs, so any control character
/// makes the target unsafe.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

fn session_key(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// The logged-in user, if any
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    pub fn id(&self) -> Option<i32> {
        self.0.as_ref().map(User::get_id)
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<DbPool>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(key) = session_key(parts) else {
            return Ok(CurrentUser(None));
        };

        let pool = Arc::<DbPool>::from_ref(state);
        let user = repo::get_session_user(&pool, &key)?;
        if user.is_none() {
            debug!("Session cookie did not resolve to a user");
        }
        Ok(CurrentUser(user))
    }
}

/// The logged-in user; anonymous requests are sent to the login page
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    Arc<DbPool>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) => Ok(RequireUser(user)),
            CurrentUser(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| "/".to_string());
                Err(AppError::LoginRequired(next))
            }
        }
    }
}
