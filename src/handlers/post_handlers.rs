use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::shared::{load_owned_post, load_visible_post, parse_pk, render_full_list, save_post_form, ListRequest};
use crate::auth::{CurrentUser, RequireUser};
use crate::db::DbPool;
use crate::dto::{FormErrors, PageQuery, PostForm};
use crate::errors::AppError;
use crate::models::{User, Visibility};
use crate::render;
use crate::repo::{self, PostFilter};
use crate::SiteSettings;

fn form_heading(visibility: Visibility, editing: bool) -> &'static str {
    match (visibility, editing) {
        (Visibility::Public, false) => "New Post",
        (Visibility::Private, false) => "New Private Post",
        (Visibility::Public, true) => "Update Post",
        (Visibility::Private, true) => "Update Private Post",
    }
}

fn new_post_url(visibility: Visibility) -> String {
    format!("{}/post/new/", visibility.url_prefix())
}

/// Where a listing of `visibility` posts starts
pub(crate) fn list_url(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "/",
        Visibility::Private => "/private/",
    }
}

pub(crate) fn new_post_page(user: &User, visibility: Visibility) -> Html<String> {
    render::post_form(
        Some(user),
        form_heading(visibility, false),
        &new_post_url(visibility),
        &PostForm::default(),
        &FormErrors::default(),
        None,
    )
}

pub(crate) async fn create_post_for(
    pool: &DbPool,
    settings: &SiteSettings,
    user: &User,
    visibility: Visibility,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = PostForm::from_multipart(multipart).await?;

    match save_post_form(pool, settings, user, visibility, None, &form).await? {
        Ok(post) => Ok(Redirect::to(&post.get_absolute_url()).into_response()),
        Err(errors) => Ok(render::post_form(
            Some(user),
            form_heading(visibility, false),
            &new_post_url(visibility),
            &form,
            &errors,
            None,
        )
        .into_response()),
    }
}

pub(crate) fn edit_post_page(pool: &DbPool, user: &User, pk: &str, visibility: Visibility) -> Result<Html<String>, AppError> {
    let summary = load_owned_post(pool, parse_pk(pk)?, visibility, user)?;
    let image = summary.post.get_image();

    Ok(render::post_form(
        Some(user),
        form_heading(visibility, true),
        &format!("{}update", summary.post.get_absolute_url()),
        &PostForm::from_post(&summary),
        &FormErrors::default(),
        image.as_deref(),
    ))
}

pub(crate) async fn update_post_for(
    pool: &DbPool,
    settings: &SiteSettings,
    user: &User,
    pk: &str,
    visibility: Visibility,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let summary = load_owned_post(pool, parse_pk(pk)?, visibility, user)?;
    let form = PostForm::from_multipart(multipart).await?;

    match save_post_form(pool, settings, user, visibility, Some(&summary), &form).await? {
        Ok(post) => Ok(Redirect::to(&post.get_absolute_url()).into_response()),
        Err(errors) => {
            let image = summary.post.get_image();
            Ok(render::post_form(
                Some(user),
                form_heading(visibility, true),
                &format!("{}update", summary.post.get_absolute_url()),
                &form,
                &errors,
                image.as_deref(),
            )
            .into_response())
        }
    }
}

pub(crate) fn confirm_delete_page(pool: &DbPool, user: &User, pk: &str, visibility: Visibility) -> Result<Html<String>, AppError> {
    let summary = load_owned_post(pool, parse_pk(pk)?, visibility, user)?;
    Ok(render::confirm_delete(Some(user), &summary))
}

pub(crate) fn delete_post_for(pool: &DbPool, user: &User, pk: &str, visibility: Visibility) -> Result<Redirect, AppError> {
    let summary = load_owned_post(pool, parse_pk(pk)?, visibility, user)?;
    repo::delete_post(pool, summary.post.get_id())?;
    info!("Deleted post {}", summary.post.get_id());
    Ok(Redirect::to(list_url(visibility)))
}

/// Handler for the home page
///
/// This function handles GET requests to `/`: every public post, newest
/// first, seven to a page.
#[instrument(skip(pool, user))]
pub async fn home_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    render_full_list(
        &pool,
        user.as_ref(),
        ListRequest {
            title: "Home",
            heading: None,
            filter: PostFilter::public(),
            base_url: "/",
            raw_page: query.page.as_deref(),
        },
    )
}

/// Handler for one author's public posts
///
/// This function handles GET requests to `/user/{username}`.
#[instrument(skip(pool, user))]
pub async fn user_posts_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let author = repo::get_user_by_username(&pool, &username)?.ok_or(AppError::NotFound)?;
    let base_url = format!("/user/{}", urlencoding::encode(&username));

    render_full_list(
        &pool,
        user.as_ref(),
        ListRequest {
            title: &username,
            heading: Some(format!("Posts by {}", author.get_username())),
            filter: PostFilter::public().by_author(author.get_id()),
            base_url: &base_url,
            raw_page: query.page.as_deref(),
        },
    )
}

/// Handler for the public posts carrying one tag
///
/// This function handles GET requests to `/tag/{pk}`.
#[instrument(skip(pool, user))]
pub async fn tag_posts_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let tag = repo::get_tag(&pool, parse_pk(&pk)?)?.ok_or(AppError::NotFound)?;
    let base_url = format!("/tag/{}", tag.get_id());

    render_full_list(
        &pool,
        user.as_ref(),
        ListRequest {
            title: &tag.get_name(),
            heading: Some(format!("Posts tagged {}", tag.get_name())),
            filter: PostFilter::public().with_tag(tag.get_id()),
            base_url: &base_url,
            raw_page: query.page.as_deref(),
        },
    )
}

/// Handler for a public post's page
///
/// This function handles GET requests to `/post/{pk}/`. Private posts are
/// never shown here.
#[instrument(skip(pool, user))]
pub async fn post_detail_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<String>,
) -> Result<Html<String>, AppError> {
    let summary = load_visible_post(&pool, parse_pk(&pk)?, Visibility::Public, user.as_ref())?;
    Ok(render::post_detail(user.as_ref(), &summary))
}

/// Handler for the empty new-post form
///
/// This function handles GET requests to `/post/new/`.
#[instrument(skip(user))]
pub async fn new_post_form_handler(RequireUser(user): RequireUser) -> Html<String> {
    new_post_page(&user, Visibility::Public)
}

/// Handler for creating a public post
///
/// This function handles POST requests to `/post/new/` and redirects to
/// the new post, or shows the form again with its errors.
#[instrument(skip_all)]
pub async fn create_post_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<SiteSettings>>,
    RequireUser(user): RequireUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    create_post_for(&pool, &settings, &user, Visibility::Public, multipart).await
}

/// Handler for the prefilled edit form
///
/// This function handles GET requests to `/post/{pk}/update`.
#[instrument(skip(pool, user))]
pub async fn edit_post_form_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Html<String>, AppError> {
    edit_post_page(&pool, &user, &pk, Visibility::Public)
}

/// Handler for saving an edited public post
///
/// This function handles POST requests to `/post/{pk}/update`. Only the
/// author may edit.
#[instrument(skip(pool, settings, user, multipart))]
pub async fn update_post_handler(
    State(pool): State<Arc<DbPool>>,
    State(settings): State<Arc<SiteSettings>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    update_post_for(&pool, &settings, &user, &pk, Visibility::Public, multipart).await
}

/// Handler for the delete confirmation page
///
/// This function handles GET requests to `/post/{pk}/delete`.
#[instrument(skip(pool, user))]
pub async fn confirm_delete_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Html<String>, AppError> {
    confirm_delete_page(&pool, &user, &pk, Visibility::Public)
}

/// Handler for deleting a public post
///
/// This function handles POST requests to `/post/{pk}/delete` and
/// redirects to the home page.
#[instrument(skip(pool, user))]
pub async fn delete_post_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Path(pk): Path<String>,
) -> Result<Redirect, AppError> {
    delete_post_for(&pool, &user, &pk, Visibility::Public)
}
