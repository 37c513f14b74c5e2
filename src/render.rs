use axum::http::StatusCode;
use axum::response::Html;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::dto::{FormErrors, LoginForm, PostForm, RegisterForm, SearchForm};
use crate::media::media_url;
use crate::models::{PostSummary, Tag, User, Visibility};
use crate::pagination::Page;
use crate::stats::{AuthorCount, SiteTotals, TagCount};

const DATE_FORMAT: &str = "%B %d, %Y";

/// Pagination shows page numbers this close to the current one
const PAGE_WINDOW: i64 = 3;

fn text(value: &str) -> String {
    encode_text(value).into_owned()
}

fn attr(value: &str) -> String {
    encode_double_quoted_attribute(value).into_owned()
}

fn layout(user: Option<&User>, title: &str, content: &str, sidebar: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            r#"<a href="/post/new/">New Post</a><a href="/private/">Private</a><a href="/dashboard/">{}</a><a href="/logout/">Logout</a>"#,
            text(&user.get_username())
        ),
        None => r#"<a href="/login/">Login</a><a href="/register/">Register</a>"#.to_string(),
    };

    Html(
        include_str!("html/base.html")
            .replace("/*style*/", include_str!("html/index.css"))
            .replace("<!--title-->", &text(title))
            .replace("<!--nav-->", &nav)
            .replace("<!--sidebar-->", sidebar)
            .replace("<!--content-->", content),
    )
}

fn field_errors(errors: &FormErrors, field: &str) -> String {
    errors
        .get(field)
        .iter()
        .map(|msg| format!(r#"<span class="errors">{}</span>"#, text(msg)))
        .collect()
}

fn tag_url(visibility: Visibility, tag: &Tag) -> String {
    format!("{}/tag/{}", visibility.url_prefix(), tag.get_id())
}

fn author_url(username: &str) -> String {
    format!("/user/{}", urlencoding::encode(username))
}

fn tag_links(summary: &PostSummary) -> String {
    let visibility = summary.post.get_visibility();
    summary
        .tags
        .iter()
        .map(|tag| {
            format!(
                r#"<a href="{}">{}</a>"#,
                attr(&tag_url(visibility, tag)),
                text(&tag.get_name())
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn image_tag(summary: &PostSummary) -> String {
    match summary.post.get_image() {
        Some(path) => format!(r#"<img src="{}" alt="">"#, attr(&media_url(&path))),
        None => String::new(),
    }
}

fn post_entry(summary: &PostSummary) -> String {
    let post = &summary.post;
    include_str!("html/templates/post.html")
        .replace("<!--author_url-->", &attr(&author_url(&summary.author)))
        .replace("<!--author-->", &text(&summary.author))
        .replace("<!--date-->", &post.get_date_posted().format(DATE_FORMAT).to_string())
        .replace("<!--url-->", &attr(&post.get_absolute_url()))
        .replace("<!--title-->", &text(&post.get_title()))
        .replace("<!--image-->", &image_tag(summary))
        .replace("<!--tags-->", &tag_links(summary))
        .replace("<!--content-->", &text(&post.get_content()))
}

/// Builds the URL of another page of the same listing
fn page_url(base_url: &str, query: &[(&str, String)], number: i64) -> String {
    let mut pairs: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();
    pairs.push(format!("page={number}"));
    format!("{}?{}", base_url, pairs.join("&"))
}

/// Links to the first, previous, nearby, next and last pages
pub fn pagination(page: &Page, base_url: &str, query: &[(&str, String)]) -> String {
    if !page.has_other_pages() {
        return String::new();
    }

    let link = |label: &str, number: i64| {
        format!(r#"<a href="{}">{}</a>"#, attr(&page_url(base_url, query, number)), label)
    };

    let mut html = String::from(r#"<div class="pagination">"#);
    if let Some(previous) = page.previous_page_number() {
        html.push_str(&link("First", 1));
        html.push_str(&link("Previous", previous));
    }
    for number in 1..=page.num_pages() {
        if number == page.number() {
            html.push_str(&format!("<strong>{number}</strong>"));
        } else if (number - page.number()).abs() < PAGE_WINDOW {
            html.push_str(&link(&number.to_string(), number));
        }
    }
    if let Some(next) = page.next_page_number() {
        html.push_str(&link("Next", next));
        html.push_str(&link("Last", page.num_pages()));
    }
    html.push_str("</div>");
    html
}

fn common_tags_box(tags: &[TagCount], visibility: Visibility) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let links: String = tags
        .iter()
        .map(|t| {
            format!(
                r#"<a class="tag" href="{}/tag/{}">{} ({})</a> "#,
                visibility.url_prefix(),
                t.tag_id,
                text(&t.name),
                t.count
            )
        })
        .collect();
    format!("<h3>Common Tags</h3><p>{links}</p>")
}

/// Everything a full post listing shows
pub struct ListView<'a> {
    pub title: &'a str,
    pub heading: Option<String>,
    /// Rendered above the posts, e.g. the search form
    pub intro: String,
    pub posts: &'a [PostSummary],
    pub page: &'a Page,
    pub base_url: &'a str,
    /// Query pairs that pagination links must keep
    pub query: Vec<(&'a str, String)>,
    pub common_tags: &'a [TagCount],
    pub visibility: Visibility,
}

pub fn post_list(user: Option<&User>, view: &ListView) -> Html<String> {
    let mut content = view.intro.clone();
    if let Some(heading) = &view.heading {
        content.push_str(&format!(
            "<h2>{} <small>({} post{})</small></h2>",
            text(heading),
            view.page.count(),
            if view.page.count() == 1 { "" } else { "s" }
        ));
    }
    if view.posts.is_empty() {
        content.push_str("<p>No posts yet.</p>");
    }
    for summary in view.posts {
        content.push_str(&post_entry(summary));
    }
    content.push_str(&pagination(view.page, view.base_url, &view.query));

    layout(user, view.title, &content, &common_tags_box(view.common_tags, view.visibility))
}

/// A table of titles, authors and dates
pub struct CompactView<'a> {
    pub title: &'a str,
    pub heading: String,
    pub posts: &'a [PostSummary],
    pub page: &'a Page,
    pub base_url: &'a str,
    pub common_tags: &'a [TagCount],
}

pub fn compact_list(user: Option<&User>, view: &CompactView) -> Html<String> {
    let rows: String = view
        .posts
        .iter()
        .map(|s| {
            format!(
                r#"<tr><td><a href="{}">{}</a></td><td><a href="{}">{}</a></td><td>{}</td></tr>"#,
                attr(&s.post.get_absolute_url()),
                text(&s.post.get_title()),
                attr(&author_url(&s.author)),
                text(&s.author),
                s.post.get_date_posted().format(DATE_FORMAT)
            )
        })
        .collect();

    let content = format!(
        "<h2>{}</h2><p>Total: {}</p><table><tr><th>Title</th><th>Author</th><th>Date</th></tr>{}</table>{}",
        text(&view.heading),
        view.page.count(),
        rows,
        pagination(view.page, view.base_url, &[])
    );

    layout(
        user,
        view.title,
        &content,
        &common_tags_box(view.common_tags, Visibility::Public),
    )
}

pub fn post_detail(user: Option<&User>, summary: &PostSummary) -> Html<String> {
    let post = &summary.post;
    let actions = if user.map(User::get_id) == Some(post.get_author_id()) {
        format!(
            r#"<a href="{url}update">Update</a> <a href="{url}delete">Delete</a>"#,
            url = attr(&post.get_absolute_url())
        )
    } else {
        String::new()
    };

    let content = include_str!("html/templates/post_detail.html")
        .replace("<!--author_url-->", &attr(&author_url(&summary.author)))
        .replace("<!--author-->", &text(&summary.author))
        .replace("<!--date-->", &post.get_date_posted().format(DATE_FORMAT).to_string())
        .replace("<!--actions-->", &actions)
        .replace("<!--title-->", &text(&post.get_title()))
        .replace("<!--image-->", &image_tag(summary))
        .replace("<!--tags-->", &tag_links(summary))
        .replace("<!--content-->", &text(&post.get_content()));

    layout(user, &post.get_title(), &content, "")
}

pub fn post_form(
    user: Option<&User>,
    heading: &str,
    action: &str,
    form: &PostForm,
    errors: &FormErrors,
    current_image: Option<&str>,
) -> Html<String> {
    let current = match current_image {
        Some(path) => format!(
            r#"Currently: <a href="{}">{}</a> <label><input type="checkbox" name="image-clear" id="image-clear_id"> Clear</label><br>"#,
            attr(&media_url(path)),
            text(path)
        ),
        None => String::new(),
    };

    let content = include_str!("html/templates/post_form.html")
        .replace("<!--heading-->", &text(heading))
        .replace("<!--action-->", &attr(action))
        .replace("<!--non_field_errors-->", &field_errors(errors, crate::dto::NON_FIELD_ERRORS))
        .replace("<!--title_errors-->", &field_errors(errors, "title"))
        .replace("<!--content_errors-->", &field_errors(errors, "content"))
        .replace("<!--tags_errors-->", &field_errors(errors, "tags"))
        .replace("<!--image_errors-->", &field_errors(errors, "image"))
        .replace("<!--current_image-->", &current)
        .replace("<!--title-->", &attr(&form.title))
        .replace("<!--tags-->", &attr(&form.tags))
        .replace("<!--content-->", &text(&form.content));

    layout(user, heading, &content, "")
}

pub fn confirm_delete(user: Option<&User>, summary: &PostSummary) -> Html<String> {
    let url = summary.post.get_absolute_url();
    let content = include_str!("html/templates/confirm_delete.html")
        .replace("<!--action-->", &attr(&format!("{url}delete")))
        .replace("<!--cancel_url-->", &attr(&url))
        .replace("<!--title-->", &text(&summary.post.get_title()));

    layout(user, "Delete Post", &content, "")
}

pub fn tag_table(user: Option<&User>, counts: &[TagCount]) -> Html<String> {
    let rows: String = counts
        .iter()
        .map(|t| {
            format!(
                r#"<tr><td><a href="/tag/{}">{}</a></td><td><a href="/tag_list/{}">{}</a></td></tr>"#,
                t.tag_id,
                text(&t.name),
                t.tag_id,
                t.count
            )
        })
        .collect();
    let content = format!("<h2>Tags</h2><table><tr><th>Tag</th><th>Posts</th></tr>{rows}</table>");
    layout(user, "Tags", &content, "")
}

pub fn author_table(user: Option<&User>, counts: &[AuthorCount]) -> Html<String> {
    let rows: String = counts
        .iter()
        .map(|a| {
            format!(
                r#"<tr><td><a href="{}">{}</a></td><td><a href="/user_list/{}">{}</a></td></tr>"#,
                attr(&author_url(&a.username)),
                text(&a.username),
                urlencoding::encode(&a.username),
                a.count
            )
        })
        .collect();
    let content = format!("<h2>Authors</h2><table><tr><th>Author</th><th>Posts</th></tr>{rows}</table>");
    layout(user, "Authors", &content, "")
}

/// The logged-in user's overview
pub struct DashboardView<'a> {
    pub public_count: i64,
    pub private_count: i64,
    pub public_tags: &'a [TagCount],
    pub private_tags: &'a [TagCount],
    pub latest: &'a [PostSummary],
    pub totals: &'a SiteTotals,
}

fn count_table(heading: &str, counts: &[TagCount], visibility: Visibility) -> String {
    if counts.is_empty() {
        return String::new();
    }
    let rows: String = counts
        .iter()
        .map(|t| {
            format!(
                r#"<tr><td><a href="{}/tag/{}">{}</a></td><td>{}</td></tr>"#,
                visibility.url_prefix(),
                t.tag_id,
                text(&t.name),
                t.count
            )
        })
        .collect();
    format!("<h3>{heading}</h3><table><tr><th>Tag</th><th>Posts</th></tr>{rows}</table>")
}

pub fn dashboard(user: &User, view: &DashboardView) -> Html<String> {
    let latest: String = view
        .latest
        .iter()
        .map(|s| {
            format!(
                r#"<li><a href="{}">{}</a> {}</li>"#,
                attr(&s.post.get_absolute_url()),
                text(&s.post.get_title()),
                s.post.get_date_posted().format(DATE_FORMAT)
            )
        })
        .collect();

    let content = format!(
        concat!(
            "<h2>Dashboard for {}</h2>",
            "<p>Public posts: {}</p><p>Private posts: {}</p>",
            "{}{}",
            "<h3>Latest posts</h3><ul>{}</ul>"
        ),
        text(&user.get_username()),
        view.public_count,
        view.private_count,
        count_table("Public tags", view.public_tags, Visibility::Public),
        count_table("Private tags", view.private_tags, Visibility::Private),
        latest
    );
    let sidebar = format!(
        "<h3>Site</h3><p>Public posts: {}<br>Users: {}<br>Tags: {}</p>",
        view.totals.public_posts, view.totals.users, view.totals.tags
    );

    layout(Some(user), "Dashboard", &content, &sidebar)
}

/// The search form as a fragment, reused above search results
pub fn search_form(heading: &str, action: &str, form: &SearchForm, errors: &FormErrors) -> String {
    include_str!("html/templates/search.html")
        .replace("<!--heading-->", &text(heading))
        .replace("<!--action-->", &attr(action))
        .replace("<!--search_term_errors-->", &field_errors(errors, "search_term"))
        .replace("<!--search_term-->", &attr(&form.search_term))
}

pub fn search_page(user: Option<&User>, heading: &str, action: &str, form: &SearchForm, errors: &FormErrors) -> Html<String> {
    layout(user, "Search", &search_form(heading, action, form, errors), "")
}

pub fn login_page(user: Option<&User>, form: &LoginForm, errors: &FormErrors) -> Html<String> {
    let content = include_str!("html/templates/login.html")
        .replace("<!--non_field_errors-->", &field_errors(errors, crate::dto::NON_FIELD_ERRORS))
        .replace("<!--username_errors-->", &field_errors(errors, "username"))
        .replace("<!--password_errors-->", &field_errors(errors, "password"))
        .replace("<!--next-->", &attr(form.next.as_deref().unwrap_or_default()))
        .replace("<!--username-->", &attr(&form.username));
    layout(user, "Log In", &content, "")
}

pub fn register_page(user: Option<&User>, form: &RegisterForm, errors: &FormErrors) -> Html<String> {
    let content = include_str!("html/templates/register.html")
        .replace("<!--username_errors-->", &field_errors(errors, "username"))
        .replace("<!--email_errors-->", &field_errors(errors, "email"))
        .replace("<!--password1_errors-->", &field_errors(errors, "password1"))
        .replace("<!--password2_errors-->", &field_errors(errors, "password2"))
        .replace("<!--username-->", &attr(&form.username))
        .replace("<!--email-->", &attr(&form.email));
    layout(user, "Register", &content, "")
}

pub fn logged_out() -> Html<String> {
    let content = r#"<article><h2>You have been logged out</h2><p><a href="/login/">Log In Again</a></p></article>"#;
    layout(None, "Logged out", content, "")
}

pub fn about(user: Option<&User>) -> Html<String> {
    layout(user, "About", include_str!("html/templates/about.html"), "")
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let heading = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let content = include_str!("html/templates/error.html")
        .replace("<!--status-->", &text(&heading))
        .replace("<!--message-->", &text(message));
    layout(None, &heading, &content, "")
}
