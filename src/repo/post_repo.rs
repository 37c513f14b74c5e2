use crate::db::DbPool;
use crate::models::{NewPost, Post, PostSummary, Tag, Visibility};
use crate::schema::{post_tags, posts, tags, users};
use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::tag_repo::set_post_tags_with;

/// Selects which posts a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostFilter {
    pub visibility: Visibility,
    pub author_id: Option<i32>,
    pub tag_id: Option<i32>,
}

impl PostFilter {
    /// Every public post
    pub fn public() -> Self {
        Self {
            visibility: Visibility::Public,
            author_id: None,
            tag_id: None,
        }
    }

    /// The private posts of one author
    pub fn private_for(author_id: i32) -> Self {
        Self {
            visibility: Visibility::Private,
            author_id: Some(author_id),
            tag_id: None,
        }
    }

    pub fn by_author(mut self, author_id: i32) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn with_tag(mut self, tag_id: i32) -> Self {
        self.tag_id = Some(tag_id);
        self
    }
}

/// Fields an edit may change; `None` leaves the column alone
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = posts)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(String::new())` clears the image
    pub image: Option<String>,
}

fn filtered(filter: &PostFilter) -> posts::BoxedQuery<'static, Sqlite> {
    let mut query = posts::table
        .filter(posts::visibility.eq(filter.visibility))
        .into_boxed();

    if let Some(author_id) = filter.author_id {
        query = query.filter(posts::author_id.eq(author_id));
    }

    if let Some(tag_id) = filter.tag_id {
        query = query.filter(
            posts::id.eq_any(
                post_tags::table
                    .filter(post_tags::tag_id.eq(tag_id))
                    .select(post_tags::post_id),
            ),
        );
    }

    query
}

/// Escapes LIKE wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn searched(filter: &PostFilter, term: &str) -> posts::BoxedQuery<'static, Sqlite> {
    let pattern = like_pattern(term);

    filtered(filter).filter(
        posts::title
            .like(pattern.clone())
            .escape('\\')
            .or(posts::content.like(pattern.clone()).escape('\\'))
            .or(posts::id.eq_any(
                post_tags::table
                    .inner_join(tags::table)
                    .filter(tags::name.like(pattern.clone()).escape('\\'))
                    .select(post_tags::post_id),
            ))
            .or(posts::author_id.eq_any(
                users::table
                    .filter(users::username.like(pattern).escape('\\'))
                    .select(users::id),
            )),
    )
}

/// Creates a post and assigns its tags in one transaction
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `new_post` - The post to insert
/// * `tag_names` - Tag names; existing tags are reused, others created
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The author does not exist (FOREIGN KEY constraint)
/// - Any insert fails, in which case nothing is written
#[instrument(skip(pool, new_post), fields(author_id = new_post.author_id, visibility = %new_post.visibility))]
pub fn create_post(pool: &DbPool, new_post: NewPost, tag_names: &[String]) -> Result<Post> {
    debug!("Creating new post");

    let conn = &mut pool.get()?;
    let post = conn.transaction(|conn| -> Result<Post> {
        let post = diesel::insert_into(posts::table)
            .values(&new_post)
            .returning(Post::as_returning())
            .get_result(conn)?;
        set_post_tags_with(conn, post.get_id(), tag_names)?;
        Ok(post)
    })?;

    info!("Created post with id: {}", post.get_id());
    Ok(post)
}

/// Retrieves a post by id regardless of visibility
#[instrument(skip(pool))]
pub fn get_post(pool: &DbPool, post_id: i32) -> Result<Option<Post>> {
    let conn = &mut pool.get()?;
    let post = posts::table
        .find(post_id)
        .select(Post::as_select())
        .first(conn)
        .optional()?;
    Ok(post)
}

/// Retrieves a post with its author name and tags
#[instrument(skip(pool))]
pub fn get_post_summary(pool: &DbPool, post_id: i32) -> Result<Option<PostSummary>> {
    let conn = &mut pool.get()?;
    let post = posts::table
        .find(post_id)
        .select(Post::as_select())
        .first(conn)
        .optional()?;

    match post {
        Some(post) => Ok(summarize(conn, vec![post])?.pop()),
        None => Ok(None),
    }
}

/// Applies an edit and, when given, replaces the tag set
///
/// ### Errors
///
/// Returns an error if the post does not exist or a write fails; the
/// edit and the tag change are applied together or not at all.
#[instrument(skip(pool, changes, tag_names))]
pub fn update_post(
    pool: &DbPool,
    post_id: i32,
    changes: PostChanges,
    tag_names: Option<&[String]>,
) -> Result<Post> {
    debug!("Updating post");

    let conn = &mut pool.get()?;
    let post = conn.transaction(|conn| -> Result<Post> {
        let exists = posts::table.find(post_id).count().get_result::<i64>(conn)? > 0;
        if !exists {
            return Err(anyhow::anyhow!("Post with id {} not found", post_id));
        }

        if changes.title.is_some() || changes.content.is_some() || changes.image.is_some() {
            diesel::update(posts::table.find(post_id))
                .set(&changes)
                .execute(conn)?;
        }
        if let Some(names) = tag_names {
            set_post_tags_with(conn, post_id, names)?;
        }

        Ok(posts::table.find(post_id).select(Post::as_select()).first(conn)?)
    })?;

    info!("Updated post with id: {}", post_id);
    Ok(post)
}

/// Deletes a post and its tag links
///
/// ### Returns
///
/// `true` if a post was deleted
#[instrument(skip(pool))]
pub fn delete_post(pool: &DbPool, post_id: i32) -> Result<bool> {
    let conn = &mut pool.get()?;
    let deleted = diesel::delete(posts::table.find(post_id)).execute(conn)?;
    debug!("Deleted {} post row(s)", deleted);
    Ok(deleted > 0)
}

/// Lists one page of posts, newest first
#[instrument(skip(pool))]
pub fn list_posts(pool: &DbPool, filter: &PostFilter, offset: i64, limit: i64) -> Result<Vec<PostSummary>> {
    let conn = &mut pool.get()?;
    let page = filtered(filter)
        .order((posts::date_posted.desc(), posts::id.desc()))
        .offset(offset)
        .limit(limit)
        .select(Post::as_select())
        .load(conn)?;

    debug!("Loaded {} post(s)", page.len());
    summarize(conn, page)
}

#[instrument(skip(pool))]
pub fn count_posts(pool: &DbPool, filter: &PostFilter) -> Result<i64> {
    let conn = &mut pool.get()?;
    Ok(filtered(filter).count().get_result(conn)?)
}

/// Lists one page of posts whose title, content, a tag name or the
/// author's username contains `term` (case-insensitive), newest first
///
/// Each post appears once however many facets it matches.
#[instrument(skip(pool))]
pub fn search_posts(
    pool: &DbPool,
    filter: &PostFilter,
    term: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<PostSummary>> {
    let conn = &mut pool.get()?;
    let page = searched(filter, term)
        .order((posts::date_posted.desc(), posts::id.desc()))
        .offset(offset)
        .limit(limit)
        .select(Post::as_select())
        .load(conn)?;

    info!("Search matched {} post(s) on this page", page.len());
    summarize(conn, page)
}

#[instrument(skip(pool))]
pub fn count_search_posts(pool: &DbPool, filter: &PostFilter, term: &str) -> Result<i64> {
    let conn = &mut pool.get()?;
    Ok(searched(filter, term).count().get_result(conn)?)
}

/// Attaches author names and tags to posts, keeping their order
fn summarize(conn: &mut SqliteConnection, page: Vec<Post>) -> Result<Vec<PostSummary>> {
    if page.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = page.iter().map(Post::get_id).collect();
    let author_ids: Vec<i32> = page.iter().map(Post::get_author_id).collect();

    let authors: HashMap<i32, String> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select((users::id, users::username))
        .load::<(i32, String)>(conn)?
        .into_iter()
        .collect();

    let mut tags_by_post: HashMap<i32, Vec<Tag>> = HashMap::new();
    let links = post_tags::table
        .inner_join(tags::table)
        .filter(post_tags::post_id.eq_any(&post_ids))
        .order(tags::name.asc())
        .select((post_tags::post_id, Tag::as_select()))
        .load::<(i32, Tag)>(conn)?;
    for (post_id, tag) in links {
        tags_by_post.entry(post_id).or_default().push(tag);
    }

    Ok(page
        .into_iter()
        .map(|post| PostSummary {
            author: authors.get(&post.get_author_id()).cloned().unwrap_or_default(),
            tags: tags_by_post.remove(&post.get_id()).unwrap_or_default(),
            post,
        })
        .collect())
}
