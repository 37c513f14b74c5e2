use axum::{
    extract::{Path, Query, State},
    response::Html,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::shared::parse_pk;
use crate::auth::CurrentUser;
use crate::db::DbPool;
use crate::dto::PageQuery;
use crate::errors::AppError;
use crate::models::{User, Visibility};
use crate::pagination::{Paginator, COMPACT_PER_PAGE};
use crate::render::{self, CompactView};
use crate::repo::{self, PostFilter};
use crate::stats::{most_common, sort_author_counts, sort_tag_counts, COMPACT_COMMON_TAGS};

fn render_compact(
    pool: &DbPool,
    user: Option<&User>,
    title: &str,
    heading: String,
    filter: PostFilter,
    base_url: &str,
    raw_page: Option<&str>,
) -> Result<Html<String>, AppError> {
    let count = repo::count_posts(pool, &filter)?;
    let page = Paginator::new(count, COMPACT_PER_PAGE).page(raw_page)?;
    let posts = repo::list_posts(pool, &filter, page.offset(), page.limit())?;
    let common_tags = most_common(
        repo::tag_counts(pool, Visibility::Public, None)?,
        COMPACT_COMMON_TAGS,
    );
    debug!("Compact list has {} post(s) in total", count);

    Ok(render::compact_list(
        user,
        &CompactView {
            title,
            heading,
            posts: &posts,
            page: &page,
            base_url,
            common_tags: &common_tags,
        },
    ))
}

/// Handler for the compact table of every public post
///
/// This function handles GET requests to `/list/`.
#[instrument(skip(pool, user))]
pub async fn compact_list_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    render_compact(
        &pool,
        user.as_ref(),
        "All posts",
        "All posts".to_string(),
        PostFilter::public(),
        "/list/",
        query.page.as_deref(),
    )
}

/// Handler for the compact table of one author's public posts
///
/// This function handles GET requests to `/user_list/{username}`.
#[instrument(skip(pool, user))]
pub async fn user_compact_list_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let author = repo::get_user_by_username(&pool, &username)?.ok_or(AppError::NotFound)?;
    let base_url = format!("/user_list/{}", urlencoding::encode(&username));

    render_compact(
        &pool,
        user.as_ref(),
        &username,
        format!("Posts by {}", author.get_username()),
        PostFilter::public().by_author(author.get_id()),
        &base_url,
        query.page.as_deref(),
    )
}

/// Handler for the compact table of public posts carrying one tag
///
/// This function handles GET requests to `/tag_list/{pk}`.
#[instrument(skip(pool, user))]
pub async fn tag_compact_list_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Path(pk): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let tag = repo::get_tag(&pool, parse_pk(&pk)?)?.ok_or(AppError::NotFound)?;
    let base_url = format!("/tag_list/{}", tag.get_id());

    render_compact(
        &pool,
        user.as_ref(),
        &tag.get_name(),
        format!("Posts tagged {}", tag.get_name()),
        PostFilter::public().with_tag(tag.get_id()),
        &base_url,
        query.page.as_deref(),
    )
}

/// Handler for the table of tags and their public post counts
///
/// This function handles GET requests to `/tags/`.
#[instrument(skip(pool, user))]
pub async fn tag_table_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let counts = sort_tag_counts(repo::tag_counts(&pool, Visibility::Public, None)?);
    Ok(render::tag_table(user.as_ref(), &counts))
}

/// Handler for the table of authors and their public post counts
///
/// This function handles GET requests to `/authors/`.
#[instrument(skip(pool, user))]
pub async fn author_table_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let counts = sort_author_counts(repo::author_counts(&pool, Visibility::Public)?);
    Ok(render::author_table(user.as_ref(), &counts))
}
