use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::auth::{removal_cookie, safe_next, session_cookie, CurrentUser, SESSION_COOKIE};
use crate::db::DbPool;
use crate::dto::{
    FormErrors, LoginForm, NextQuery, RegisterForm, INVALID_LOGIN, NON_FIELD_ERRORS, USERNAME_TAKEN,
};
use crate::errors::AppError;
use crate::render;
use crate::repo;
use crate::SiteSettings;

/// Handler for the sign-up form
///
/// This function handles GET requests to `/register/`.
#[instrument(skip(user))]
pub async fn register_form_handler(CurrentUser(user): CurrentUser) -> Html<String> {
    render::register_page(user.as_ref(), &RegisterForm::default(), &FormErrors::default())
}

/// Handler for creating an account
///
/// This function handles POST requests to `/register/` and redirects to
/// the login page once the account exists.
#[instrument(skip_all)]
pub async fn register_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let mut errors = form.validate();
    let username = form.username.trim();

    if errors.get("username").is_empty() && repo::get_user_by_username(&pool, username)?.is_some() {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        return Ok(render::register_page(user.as_ref(), &form, &errors).into_response());
    }

    let created = match repo::create_user(&pool, username, form.email.trim(), &form.password1) {
        Ok(created) => created,
        Err(e) if repo::is_unique_violation(&e) => {
            warn!("Username {} was registered concurrently", username);
            errors.add("username", USERNAME_TAKEN);
            return Ok(render::register_page(user.as_ref(), &form, &errors).into_response());
        }
        Err(e) => return Err(e.into()),
    };
    info!("Registered user {}", created.get_username());
    Ok(Redirect::to("/login/").into_response())
}

/// Handler for the login form
///
/// This function handles GET requests to `/login/`; `next` is carried
/// through the form.
#[instrument(skip(user))]
pub async fn login_form_handler(CurrentUser(user): CurrentUser, Query(query): Query<NextQuery>) -> Html<String> {
    let form = LoginForm {
        next: query.next,
        ..Default::default()
    };
    render::login_page(user.as_ref(), &form, &FormErrors::default())
}

/// Handler for logging in
///
/// This function handles POST requests to `/login/`. On success it sets the
/// session cookie and redirects to `next` when that is a local path,
/// otherwise to `/`.
#[instrument(skip_all)]
pub async fn login_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<SiteSettings>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let mut errors = form.validate();
    if errors.is_empty() {
        match repo::authenticate(&pool, form.username.trim(), &form.password)? {
            Some(user) => {
                let session = repo::create_session(&pool, user.get_id(), settings.session_ttl)?;
                info!("User {} logged in", user.get_username());
                let target = safe_next(form.next.as_deref());
                return Ok((jar.add(session_cookie(session.get_session_key())), Redirect::to(&target)).into_response());
            }
            None => {
                warn!("Failed login attempt");
                errors.add(NON_FIELD_ERRORS, INVALID_LOGIN);
            }
        }
    }

    let form = LoginForm {
        password: String::new(),
        ..form
    };
    Ok(render::login_page(None, &form, &errors).into_response())
}

/// Handler for logging out
///
/// This function handles GET and POST requests to `/logout/`. The session
/// is deleted server-side and the cookie cleared.
#[instrument(skip_all)]
pub async fn logout_handler(
    State(pool): State<Arc<DbPool>>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        repo::delete_session(&pool, cookie.value())?;
        info!("Session ended");
    }
    Ok((jar.remove(removal_cookie()), render::logged_out()))
}
