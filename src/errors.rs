use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::pagination::PageError;
use crate::render;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Page not found")]
    NotFound,
    #[error("You do not have permission to perform this action")]
    Forbidden,
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Anonymous request to a page that needs an account; carries the
    /// path to come back to after logging in
    #[error("Login required")]
    LoginRequired(String),
}

impl From<PageError> for AppError {
    fn from(_: PageError) -> Self {
        AppError::NotFound
    }
}

/// Builds the login URL that returns to `next` afterwards
pub fn login_url(next: &str) -> String {
    format!("/login/?next={}", urlencoding::encode(next))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(err) => {
                error!("Database error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Page not found".to_string()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::LoginRequired(next) => {
                return Redirect::to(&login_url(&next)).into_response();
            }
        };

        (status, render::error_page(status, &message)).into_response()
    }
}

#[cfg(test)]
mod tests;
