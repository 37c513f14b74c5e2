use crate::db::DbPool;
use crate::models::Visibility;
use crate::schema::{posts, tags, users};
use crate::stats::{AuthorCount, SiteTotals};
use anyhow::Result;
use diesel::dsl::count_star;
use diesel::prelude::*;
use tracing::instrument;

/// Counts posts of one visibility per author
///
/// Authors without such posts are left out. Ordering is applied by
/// [`crate::stats::sort_author_counts`].
#[instrument(skip(pool))]
pub fn author_counts(pool: &DbPool, visibility: Visibility) -> Result<Vec<AuthorCount>> {
    let conn = &mut pool.get()?;
    let rows: Vec<(String, i64)> = posts::table
        .inner_join(users::table)
        .filter(posts::visibility.eq(visibility))
        .group_by((users::id, users::username))
        .select((users::username, count_star()))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(username, count)| AuthorCount { username, count })
        .collect())
}

/// Totals shown on the dashboard
#[instrument(skip(pool))]
pub fn site_totals(pool: &DbPool) -> Result<SiteTotals> {
    let conn = &mut pool.get()?;
    let public_posts = posts::table
        .filter(posts::visibility.eq(Visibility::Public))
        .count()
        .get_result(conn)?;
    let users = users::table.count().get_result(conn)?;
    let tags = tags::table.count().get_result(conn)?;

    Ok(SiteTotals { public_posts, users, tags })
}
