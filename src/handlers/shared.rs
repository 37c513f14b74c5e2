use axum::response::Html;
use tracing::{debug, info};

use crate::db::DbPool;
use crate::dto::{FormErrors, PostForm};
use crate::errors::AppError;
use crate::media;
use crate::models::{NewPost, Post, PostSummary, User, Visibility};
use crate::pagination::{Paginator, POSTS_PER_PAGE};
use crate::render::{self, ListView};
use crate::repo::{self, PostChanges, PostFilter};
use crate::stats::{most_common, COMMON_TAGS};
use crate::SiteSettings;

/// Route parameters that should be ids; anything else is a missing page
///
/// Only plain digits count, so `+5` or ` 5` are not aliases of `5`.
pub(crate) fn parse_pk(raw: &str) -> Result<i32, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::NotFound);
    }
    raw.parse().map_err(|_| AppError::NotFound)
}

/// What one full listing page shows
pub(crate) struct ListRequest<'a> {
    pub title: &'a str,
    pub heading: Option<String>,
    pub filter: PostFilter,
    pub base_url: &'a str,
    pub raw_page: Option<&'a str>,
}

/// Author whose tags the common tags box counts
///
/// Public pages always show the site-wide favourites. Private pages only
/// count the viewer's own posts.
pub(crate) fn common_tags_scope(filter: &PostFilter) -> Option<i32> {
    match filter.visibility {
        Visibility::Public => None,
        Visibility::Private => filter.author_id,
    }
}

/// Renders a page of posts with the most common tags
pub(crate) fn render_full_list(pool: &DbPool, user: Option<&User>, list: ListRequest) -> Result<Html<String>, AppError> {
    let count = repo::count_posts(pool, &list.filter)?;
    let page = Paginator::new(count, POSTS_PER_PAGE).page(list.raw_page)?;
    let posts = repo::list_posts(pool, &list.filter, page.offset(), page.limit())?;
    let common_tags = most_common(
        repo::tag_counts(pool, list.filter.visibility, common_tags_scope(&list.filter))?,
        COMMON_TAGS,
    );
    debug!("Rendering page {} of {}", page.number(), page.num_pages());

    Ok(render::post_list(
        user,
        &ListView {
            title: list.title,
            heading: list.heading,
            intro: String::new(),
            posts: &posts,
            page: &page,
            base_url: list.base_url,
            query: Vec::new(),
            common_tags: &common_tags,
            visibility: list.filter.visibility,
        },
    ))
}

/// Loads a post that `user` may read under the given URL space
///
/// Posts of the other visibility and other users' private posts are
/// reported as missing.
pub(crate) fn load_visible_post(
    pool: &DbPool,
    post_id: i32,
    visibility: Visibility,
    user: Option<&User>,
) -> Result<PostSummary, AppError> {
    let summary = repo::get_post_summary(pool, post_id)?.ok_or(AppError::NotFound)?;
    let post = &summary.post;

    if post.get_visibility() != visibility {
        return Err(AppError::NotFound);
    }
    if post.is_private() && user.map(User::get_id) != Some(post.get_author_id()) {
        return Err(AppError::NotFound);
    }
    Ok(summary)
}

/// Loads a post `user` may edit or delete
pub(crate) fn load_owned_post(
    pool: &DbPool,
    post_id: i32,
    visibility: Visibility,
    user: &User,
) -> Result<PostSummary, AppError> {
    let summary = load_visible_post(pool, post_id, visibility, Some(user))?;
    if summary.post.get_author_id() != user.get_id() {
        return Err(AppError::Forbidden);
    }
    Ok(summary)
}

/// Validates a submitted post form and writes it
///
/// With `existing`, the post is updated in place and keeps its author,
/// visibility and date; otherwise a new post is created for `user`.
///
/// ### Returns
///
/// The saved post, or the form errors to show when the form is invalid
pub(crate) async fn save_post_form(
    pool: &DbPool,
    settings: &SiteSettings,
    user: &User,
    visibility: Visibility,
    existing: Option<&PostSummary>,
    form: &PostForm,
) -> Result<Result<Post, FormErrors>, AppError> {
    let errors = form.validate();
    if !errors.is_empty() {
        debug!("Post form rejected: {:?}", errors);
        return Ok(Err(errors));
    }

    let image = match &form.image {
        Some(upload) => Some(media::save_image(&settings.media_dir, &upload.filename, &upload.data).await?),
        None if form.clear_image => Some(String::new()),
        None => None,
    };
    let tags = form.tag_names();

    let post = match existing {
        Some(summary) => {
            let changes = PostChanges {
                title: Some(form.clean_title()),
                content: Some(form.clean_content()),
                image,
            };
            repo::update_post(pool, summary.post.get_id(), changes, Some(&tags))?
        }
        None => {
            let new_post = NewPost::new(
                user.get_id(),
                visibility,
                form.clean_title(),
                form.clean_content(),
                image.filter(|path| !path.is_empty()),
            );
            repo::create_post(pool, new_post, &tags)?
        }
    };

    info!("Saved post {} for user {}", post.get_id(), user.get_id());
    Ok(Ok(post))
}
