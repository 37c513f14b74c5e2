use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, Redirect, Response},
};
use std::sync::Arc;
use tracing::instrument;

use super::post_handlers::{
    confirm_delete_page, create_post_for, delete_post_for, edit_post_page, new_post_page, update_post_for,
};
use super::shared::{load_visible_post, parse_pk, render_full_list, ListRequest};
use crate::auth::RequireUser;
use crate::db::DbPool;
use crate::dto::PageQuery;
use crate::errors::AppError;
use crate::models::Visibility;
use crate::render;
use crate::repo::{self, PostFilter};
use crate::SiteSettings;

/// Handler for the logged-in user's private posts
///
/// This function handles GET requests to `/private/`.
#[instrument(skip(pool, user))]
pub async fn private_home_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    render_full_list(
        &pool,
        Some(&user),
        ListRequest {
            title: "Private",
            heading: Some("Private posts".to_string()),
            filter: PostFilter::private_for(user.get_id()),
            base_url: "/private/",
            raw_page: query.page.as_deref(),
        },
    )
}

/// Handler for the user's private posts carrying one tag
///
/// This function handles GET requests to `/private/tag/{pk}`.
#[instrument(skip(pool, user))]
pub async fn private_tag_posts_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let tag = repo::get_tag(&pool, parse_pk(&pk)?)?.ok_or(AppError::NotFound)?;
    let base_url = format!("/private/tag/{}", tag.get_id());

    render_full_list(
        &pool,
        Some(&user),
        ListRequest {
            title: &tag.get_name(),
            heading: Some(format!("Private posts tagged {}", tag.get_name())),
            filter: PostFilter::private_for(user.get_id()).with_tag(tag.get_id()),
            base_url: &base_url,
            raw_page: query.page.as_deref(),
        },
    )
}

/// Handler for a private post's page
///
/// This function handles GET requests to `/private/post/{pk}/`. Other
/// users' private posts read as missing.
#[instrument(skip(pool, user))]
pub async fn private_post_detail_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Html<String>, AppError> {
    let summary = load_visible_post(&pool, parse_pk(&pk)?, Visibility::Private, Some(&user))?;
    Ok(render::post_detail(Some(&user), &summary))
}

#[instrument(skip(user))]
pub async fn private_new_post_form_handler(RequireUser(user): RequireUser) -> Html<String> {
    new_post_page(&user, Visibility::Private)
}

/// Handler for creating a private post
///
/// This function handles POST requests to `/private/post/new/`.
#[instrument(skip_all)]
pub async fn private_create_post_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<SiteSettings>>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    create_post_for(&pool, &settings, &user, Visibility::Private, multipart).await
}

#[instrument(skip(pool, user))]
pub async fn private_edit_post_form_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Html<String>, AppError> {
    edit_post_page(&pool, &user, &pk, Visibility::Private)
}

/// Handler for saving an edited private post
///
/// This function handles POST requests to `/private/post/{pk}/update`.
#[instrument(skip(pool, settings, user, multipart))]
pub async fn private_update_post_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<SiteSettings>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    update_post_for(&pool, &settings, &user, &pk, Visibility::Private, multipart).await
}

#[instrument(skip(pool, user))]
pub async fn private_confirm_delete_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Html<String>, AppError> {
    confirm_delete_page(&pool, &user, &pk, Visibility::Private)
}

/// Handler for deleting a private post
///
/// This function handles POST requests to `/private/post/{pk}/delete` and
/// redirects to `/private/`.
#[instrument(skip(pool, user))]
pub async fn private_delete_post_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Redirect, AppError> {
    delete_post_for(&pool, &user, &pk, Visibility::Private)
}
