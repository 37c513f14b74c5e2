/// Integration tests for search
///
/// Search matches the term against titles, contents, tag names and author
/// usernames, and pages its results with the term kept in the links.

mod common;

use axum::http::StatusCode;
use blogpress::models::Visibility;
use common::*;

/// Tests the empty search form
#[tokio::test]
async fn test_search_form() {
    let mut test = create_test_app();

    let response = test.get("/search/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Search posts"));
    assert!(body.contains(r#"name="search_term""#));
}

/// Tests that a submitted search finds posts by each facet
#[tokio::test]
async fn test_search_matches_all_fields() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    let zed = test.create_user("zebra_writer");
    test.create_post(&alice, Visibility::Public, "Zebra crossing", &[], 0);
    test.create_post(&alice, Visibility::Public, "Animals", &["zebras"], 1);
    test.create_post(&zed, Visibility::Public, "Untitled", &[], 2);
    test.create_post(&alice, Visibility::Public, "Unrelated", &[], 3);
    test.create_post(&alice, Visibility::Private, "Private zebra", &[], 4);

    let response = test.post_form("/search/", None, &[("search_term", "zebra")]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Zebra crossing"));
    assert!(body.contains("Animals"));
    assert!(body.contains("Untitled"));
    assert!(!body.contains("Unrelated"));
    assert!(!body.contains("Private zebra"));
    assert!(body.contains("(3 posts)"));
}

/// Tests that a blank term shows the form with an error
#[tokio::test]
async fn test_search_blank_term() {
    let mut test = create_test_app();

    let response = test.post_form("/search/", None, &[("search_term", "   ")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("This field is required."));
}

/// Tests that search result pages keep the term in their links
#[tokio::test]
async fn test_search_pagination() {
    let mut test = create_test_app();
    let alice = test.create_user("alice");
    for i in 0..8 {
        test.create_post(&alice, Visibility::Public, &format!("Kiwi fact {i}"), &[], i);
    }

    let first = body_text(test.post_form("/search/", None, &[("search_term", "kiwi fact")]).await).await;
    assert!(first.contains("/search/?search_term=kiwi%20fact&amp;page=2") || first.contains("/search/?search_term=kiwi%20fact&page=2"));
    assert!(!first.contains("Kiwi fact 0<"));

    let response = test.get("/search/?search_term=kiwi%20fact&page=2", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_text(response).await;
    assert!(second.contains("Kiwi fact 0"));
    assert!(!second.contains("Kiwi fact 7"));

    assert_eq!(
        test.get("/search/?search_term=kiwi&page=5", None).await.status(),
        StatusCode::NOT_FOUND
    );
}

/// Tests that a search with no hits still renders
#[tokio::test]
async fn test_search_no_results() {
    let mut test = create_test_app();

    let body = body_text(test.post_form("/search/", None, &[("search_term", "nothing")]).await).await;
    assert!(body.contains("Results for"));
    assert!(body.contains("No posts yet."));
}

/// Tests that private search covers only the user's own private posts
#[tokio::test]
async fn test_private_search() {
    let mut test = create_test_app();
    let (alice, cookie) = test.user_with_session("alice").await;
    let bob = test.create_user("bob");
    test.create_post(&alice, Visibility::Private, "Alice garden notes", &[], 0);
    test.create_post(&alice, Visibility::Public, "Alice garden blog", &[], 1);
    test.create_post(&bob, Visibility::Private, "Bob garden notes", &[], 2);

    let response = test
        .post_form("/private/search/", Some(&cookie), &[("search_term", "garden")])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains("Search private posts"));
    assert!(body.contains("Alice garden notes"));
    assert!(!body.contains("Alice garden blog"));
    assert!(!body.contains("Bob garden notes"));

    let response = test
        .post_form("/private/search/", None, &[("search_term", "garden")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
