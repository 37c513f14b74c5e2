/// Integration tests for the compact listings and aggregation tables
///
/// Covers `/list/`, `/user_list/{username}`, `/tag_list/{pk}`, `/tags/`
/// and `/authors/`.

mod common;

use axum::http::StatusCode;
use blogpress::models::Visibility;
use blogpress::repo;
use common::*;

/// Tests the compact table of all public posts
#[tokio::test]
async fn test_compact_list() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    let bob = test.create_user("bob");
    test.create_post(&alice, Visibility::Public, "Alpha", &["rust"], 0);
    test.create_post(&bob, Visibility::Public, "Beta", &["go"], 1);
    test.create_post(&bob, Visibility::Private, "Gamma", &[], 2);

    let response = test.get("/list/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Total: 2"));
    assert!(body.contains("Alpha"));
    assert!(body.contains("Beta"));
    assert!(!body.contains("Gamma"));
    assert!(body.find("Beta").unwrap() < body.find("Alpha").unwrap());
}

/// Tests that the compact list pages by fifty
#[tokio::test]
async fn test_compact_list_pagination() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    for i in 0..51 {
        test.create_post(&alice, Visibility::Public, &format!("Entry {i:03}"), &[], i);
    }

    let first = body_text(test.get("/list/", None).await).await;
    assert!(first.contains("Entry 050"));
    assert!(first.contains("Entry 001"));
    assert!(!first.contains("Entry 000"));
    assert!(first.contains("/list/?page=2"));

    let second = body_text(test.get("/list/?page=2", None).await).await;
    assert!(second.contains("Entry 000"));

    assert_eq!(test.get("/list/?page=3", None).await.status(), StatusCode::NOT_FOUND);
}

/// Tests the per-author and per-tag compact lists
#[tokio::test]
async fn test_user_and_tag_compact_lists() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    let bob = test.create_user("bob");
    let tagged = test.create_post(&alice, Visibility::Public, "Alice rust", &["rust"], 0);
    test.create_post(&alice, Visibility::Public, "Alice misc", &[], 1);
    test.create_post(&bob, Visibility::Public, "Bob rust", &["rust"], 2);

    let body = body_text(test.get("/user_list/alice", None).await).await;
    assert!(body.contains("Posts by alice"));
    assert!(body.contains("Alice rust"));
    assert!(body.contains("Alice misc"));
    assert!(!body.contains("Bob rust"));

    let tag_id = repo::get_post_summary(&test.pool, tagged.get_id()).unwrap().unwrap().tags[0].get_id();
    let body = body_text(test.get(&format!("/tag_list/{tag_id}"), None).await).await;
    assert!(body.contains("Posts tagged rust"));
    assert!(body.contains("Alice rust"));
    assert!(body.contains("Bob rust"));
    assert!(!body.contains("Alice misc"));

    assert_eq!(test.get("/user_list/nobody", None).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(test.get("/tag_list/424242", None).await.status(), StatusCode::NOT_FOUND);
}

/// Tests the tag table counts only public posts, most used first
#[tokio::test]
async fn test_tag_table() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    test.create_post(&alice, Visibility::Public, "One", &["rust", "web"], 0);
    test.create_post(&alice, Visibility::Public, "Two", &["rust"], 1);
    test.create_post(&alice, Visibility::Private, "Three", &["rust", "secret"], 2);

    let body = body_text(test.get("/tags/", None).await).await;
    let rust_row = body.find(">rust<").expect("rust row missing");
    let web_row = body.find(">web<").expect("web row missing");
    assert!(rust_row < web_row);
    assert!(!body.contains(">secret<"));

    let rust_id = repo::get_tag_by_name(&test.pool, "rust").unwrap().unwrap().get_id();
    assert!(body.contains(&format!(r#"<a href="/tag_list/{rust_id}">2</a>"#)));
}

/// Tests the author table counts only public posts
#[tokio::test]
async fn test_author_table() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    let bob = test.create_user("bob");
    test.create_user("carol");
    test.create_post(&alice, Visibility::Public, "A1", &[], 0);
    test.create_post(&bob, Visibility::Public, "B1", &[], 1);
    test.create_post(&bob, Visibility::Public, "B2", &[], 2);
    test.create_post(&alice, Visibility::Private, "A2", &[], 3);

    let body = body_text(test.get("/authors/", None).await).await;
    assert!(body.contains(r#"<a href="/user_list/bob">2</a>"#));
    assert!(body.contains(r#"<a href="/user_list/alice">1</a>"#));
    assert!(body.find(">bob<").unwrap() < body.find(">alice<").unwrap());
    assert!(!body.contains(">carol<"));
}

/// Tests that per-author pages show the site-wide common tags
#[tokio::test]
async fn test_author_pages_show_site_wide_common_tags() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    let bob = test.create_user("bob");
    test.create_post(&alice, Visibility::Public, "Alice post", &["alpha"], 0);
    test.create_post(&bob, Visibility::Public, "Bob one", &["beta"], 1);
    test.create_post(&bob, Visibility::Public, "Bob two", &["beta"], 2);

    for uri in ["/user/alice", "/user_list/alice"] {
        let body = body_text(test.get(uri, None).await).await;
        assert!(body.contains("Alice post"), "{uri}");
        assert!(!body.contains("Bob one"), "{uri}");
        assert!(body.contains("beta (2)"), "{uri} is missing bob's tag:\n{body}");
        assert!(body.contains("alpha (1)"), "{uri}");
    }
}
