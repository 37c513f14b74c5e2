use serde::Serialize;
use std::cmp::Ordering;

/// Number of common tags shown beside the full listings
pub const COMMON_TAGS: usize = 5;

/// Number of common tags shown beside the compact listings
pub const COMPACT_COMMON_TAGS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag_id: i32,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub username: String,
    pub count: i64,
}

/// Site-wide totals shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteTotals {
    pub public_posts: i64,
    pub users: i64,
    pub tags: i64,
}

fn by_count_then_name(a_count: i64, a_name: &str, b_count: i64, b_name: &str) -> Ordering {
    b_count.cmp(&a_count).then_with(|| a_name.cmp(b_name))
}

/// Most used first; equal counts ordered by name
pub fn sort_tag_counts(mut counts: Vec<TagCount>) -> Vec<TagCount> {
    counts.sort_by(|a, b| by_count_then_name(a.count, &a.name, b.count, &b.name));
    counts
}

/// Most prolific first; equal counts ordered by username
pub fn sort_author_counts(mut counts: Vec<AuthorCount>) -> Vec<AuthorCount> {
    counts.sort_by(|a, b| by_count_then_name(a.count, &a.username, b.count, &b.username));
    counts
}

/// The `n` most used tags, dropping tags with no posts
pub fn most_common(counts: Vec<TagCount>, n: usize) -> Vec<TagCount> {
    sort_tag_counts(counts)
        .into_iter()
        .filter(|t| t.count > 0)
        .take(n)
        .collect()
}
