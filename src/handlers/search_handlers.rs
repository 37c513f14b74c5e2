use axum::{
    extract::{Query, State},
    response::Html,
    Form,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, RequireUser};
use crate::db::DbPool;
use crate::dto::{FormErrors, SearchForm, SearchQuery};
use crate::errors::AppError;
use crate::models::User;
use crate::pagination::{Paginator, POSTS_PER_PAGE};
use crate::render::{self, ListView};
use crate::repo::{self, PostFilter};

/// Where a search form posts to, and how its page is headed
struct SearchScope {
    action: &'static str,
    heading: &'static str,
    filter: PostFilter,
}

fn public_scope() -> SearchScope {
    SearchScope {
        action: "/search/",
        heading: "Search posts",
        filter: PostFilter::public(),
    }
}

fn private_scope(user: &User) -> SearchScope {
    SearchScope {
        action: "/private/search/",
        heading: "Search private posts",
        filter: PostFilter::private_for(user.get_id()),
    }
}

fn render_results(
    pool: &DbPool,
    user: Option<&User>,
    scope: &SearchScope,
    term: &str,
    raw_page: Option<&str>,
) -> Result<Html<String>, AppError> {
    let term = term.trim();
    let count = repo::count_search_posts(pool, &scope.filter, term)?;
    let page = Paginator::new(count, POSTS_PER_PAGE).page(raw_page)?;
    let posts = repo::search_posts(pool, &scope.filter, term, page.offset(), page.limit())?;
    info!("Search for {:?} matched {} post(s)", term, count);

    let form = SearchForm { search_term: term.to_string() };
    Ok(render::post_list(
        user,
        &ListView {
            title: "Search",
            heading: Some(format!("Results for \"{term}\"")),
            intro: render::search_form(scope.heading, scope.action, &form, &FormErrors::default()),
            posts: &posts,
            page: &page,
            base_url: scope.action,
            query: vec![("search_term", term.to_string())],
            common_tags: &[],
            visibility: scope.filter.visibility,
        },
    ))
}

/// Shows the empty form, or a results page when the query carries a term
fn show(pool: &DbPool, user: Option<&User>, scope: &SearchScope, query: &SearchQuery) -> Result<Html<String>, AppError> {
    match query.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(term) => render_results(pool, user, scope, term, query.page.as_deref()),
        None => Ok(render::search_page(
            user,
            scope.heading,
            scope.action,
            &SearchForm::default(),
            &FormErrors::default(),
        )),
    }
}

/// Shows the first page of results, or the form with its errors
fn submit(pool: &DbPool, user: Option<&User>, scope: &SearchScope, form: &SearchForm) -> Result<Html<String>, AppError> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(render::search_page(user, scope.heading, scope.action, form, &errors));
    }
    render_results(pool, user, scope, &form.search_term, None)
}

/// Handler for the public search page
///
/// This function handles GET requests to `/search/`. Pagination links
/// carry the term as `?search_term=...&page=N`.
#[instrument(skip(pool, user))]
pub async fn search_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    show(&pool, user.as_ref(), &public_scope(), &query)
}

/// Handler for a submitted public search
///
/// This function handles POST requests to `/search/`.
#[instrument(skip(pool, user))]
pub async fn search_submit_handler(
    State(pool): State<Arc<DbPool>>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    submit(&pool, user.as_ref(), &public_scope(), &form)
}

/// Handler for searching the user's own private posts
///
/// This function handles GET requests to `/private/search/`.
#[instrument(skip(pool, user))]
pub async fn private_search_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    show(&pool, Some(&user), &private_scope(&user), &query)
}

/// Handler for a submitted private search
///
/// This function handles POST requests to `/private/search/`.
#[instrument(skip(pool, user))]
pub async fn private_search_submit_handler(
    State(pool): State<Arc<DbPool>>,
    RequireUser(user): RequireUser,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, AppError> {
    submit(&pool, Some(&user), &private_scope(&user), &form)
}
