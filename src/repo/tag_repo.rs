use crate::db::DbPool;
use crate::models::{NewTag, PostTag, Tag, Visibility};
use crate::schema::{post_tags, posts, tags};
use crate::stats::TagCount;
use anyhow::Result;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::{debug, instrument};

/// Returns the tag with this exact name, creating it if needed
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `name` - The tag name; matched case-sensitively
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The insert or the follow-up lookup fails
#[instrument(skip(pool))]
pub fn get_or_create_tag(pool: &DbPool, name: &str) -> Result<Tag> {
    let conn = &mut pool.get()?;
    get_or_create_tag_with(conn, name)
}

pub(crate) fn get_or_create_tag_with(conn: &mut SqliteConnection, name: &str) -> Result<Tag> {
    let inserted = diesel::insert_or_ignore_into(tags::table)
        .values(NewTag { name: name.to_string() })
        .execute(conn)?;
    if inserted > 0 {
        debug!("Created tag {:?}", name);
    }

    let tag = tags::table
        .filter(tags::name.eq(name))
        .select(Tag::as_select())
        .first(conn)?;
    Ok(tag)
}

/// Retrieves a tag by id
#[instrument(skip(pool))]
pub fn get_tag(pool: &DbPool, tag_id: i32) -> Result<Option<Tag>> {
    let conn = &mut pool.get()?;
    let tag = tags::table
        .find(tag_id)
        .select(Tag::as_select())
        .first(conn)
        .optional()?;
    Ok(tag)
}

/// Retrieves a tag by its exact name
#[instrument(skip(pool))]
pub fn get_tag_by_name(pool: &DbPool, name: &str) -> Result<Option<Tag>> {
    let conn = &mut pool.get()?;
    let tag = tags::table
        .filter(tags::name.eq(name))
        .select(Tag::as_select())
        .first(conn)
        .optional()?;
    Ok(tag)
}

/// Lists all tags ordered by name
#[instrument(skip(pool))]
pub fn list_tags(pool: &DbPool) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;
    let result = tags::table
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(conn)?;
    Ok(result)
}

/// Replaces the tag set of a post
///
/// Names that match an existing tag reuse it; unknown names create new
/// tags. Tags dropped from the post are kept in the tag table.
#[instrument(skip(pool))]
pub fn set_post_tags(pool: &DbPool, post_id: i32, names: &[String]) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;
    conn.transaction(|conn| set_post_tags_with(conn, post_id, names))
}

pub(crate) fn set_post_tags_with(
    conn: &mut SqliteConnection,
    post_id: i32,
    names: &[String],
) -> Result<Vec<Tag>> {
    diesel::delete(post_tags::table.filter(post_tags::post_id.eq(post_id))).execute(conn)?;

    let mut assigned = Vec::with_capacity(names.len());
    for name in names {
        let tag = get_or_create_tag_with(conn, name)?;
        diesel::insert_or_ignore_into(post_tags::table)
            .values(PostTag::new(post_id, tag.get_id()))
            .execute(conn)?;
        assigned.push(tag);
    }

    assigned.sort_by(|a, b| a.get_name().cmp(&b.get_name()));
    assigned.dedup();
    debug!("Post {} now has {} tag(s)", post_id, assigned.len());
    Ok(assigned)
}

/// Lists the tags of one post ordered by name
#[instrument(skip(pool))]
pub fn list_tags_for_post(pool: &DbPool, post_id: i32) -> Result<Vec<Tag>> {
    let conn = &mut pool.get()?;
    let result = post_tags::table
        .inner_join(tags::table)
        .filter(post_tags::post_id.eq(post_id))
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load(conn)?;
    Ok(result)
}

/// Counts posts per tag among posts of one visibility
///
/// ### Arguments
///
/// * `visibility` - Which posts to count
/// * `author_id` - Restrict the count to one author's posts
///
/// ### Returns
///
/// One entry per tag used at least once, in no particular order; see
/// [`crate::stats::sort_tag_counts`]
#[instrument(skip(pool))]
pub fn tag_counts(pool: &DbPool, visibility: Visibility, author_id: Option<i32>) -> Result<Vec<TagCount>> {
    let conn = &mut pool.get()?;

    let base = post_tags::table
        .inner_join(tags::table)
        .inner_join(posts::table)
        .filter(posts::visibility.eq(visibility));

    let rows: Vec<(i32, String, i64)> = match author_id {
        Some(author_id) => base
            .filter(posts::author_id.eq(author_id))
            .group_by((tags::id, tags::name))
            .select((tags::id, tags::name, count_star()))
            .load(conn)?,
        None => base
            .group_by((tags::id, tags::name))
            .select((tags::id, tags::name, count_star()))
            .load(conn)?,
    };

    Ok(rows
        .into_iter()
        .map(|(tag_id, name, count)| TagCount { tag_id, name, count })
        .collect())
}

#[instrument(skip(pool))]
pub fn count_tags(pool: &DbPool) -> Result<i64> {
    let conn = &mut pool.get()?;
    Ok(tags::table.count().get_result(conn)?)
}
