use axum::{extract::State, response::Html};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::auth::{CurrentUser, RequireUser};
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::Visibility;
use crate::render::{self, DashboardView};
use crate::repo::{self, PostFilter};
use crate::stats::sort_tag_counts;

/// Number of the user's own posts listed on the dashboard
pub const DASHBOARD_LATEST: i64 = 5;

/// Handler for the about page
///
/// This function handles GET requests to `/about/`.
#[instrument(skip(user))]
pub async fn about_handler(CurrentUser(user): CurrentUser) -> Html<String> {
    render::about(user.as_ref())
}

/// Handler for the user's dashboard
///
/// This function handles GET requests to `/dashboard/`: the user's post
/// counts, tag tables and latest posts, beside site-wide totals.
#[instrument(skip(pool, user))]
pub async fn dashboard_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
) -> Result<Html<String>, AppError> {
    let public = PostFilter::public().by_author(user.get_id());
    let private = PostFilter::private_for(user.get_id());

    let mut latest = repo::list_posts(&pool, &public, 0, DASHBOARD_LATEST)?;
    latest.extend(repo::list_posts(&pool, &private, 0, DASHBOARD_LATEST)?);
    latest.sort_by(|a, b| {
        (b.post.get_date_posted(), b.post.get_id()).cmp(&(a.post.get_date_posted(), a.post.get_id()))
    });
    latest.truncate(DASHBOARD_LATEST as usize);

    let public_tags = sort_tag_counts(repo::tag_counts(&pool, Visibility::Public, Some(user.get_id()))?);
    let private_tags = sort_tag_counts(repo::tag_counts(&pool, Visibility::Private, Some(user.get_id()))?);
    let totals = repo::site_totals(&pool)?;
    debug!("Dashboard totals: {:?}", totals);

    Ok(render::dashboard(
        &user,
        &DashboardView {
            public_count: repo::count_posts(&pool, &public)?,
            private_count: repo::count_posts(&pool, &private)?,
            public_tags: &public_tags,
            private_tags: &private_tags,
            latest: &latest,
            totals: &totals,
        },
    ))
}

/// Handler for every unknown path
pub async fn not_found_handler() -> AppError {
    AppError::NotFound
}
