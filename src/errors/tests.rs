use super::*;
use axum::body::to_bytes;
use axum::http::header::LOCATION;

/// Helper to extract status code and body text from an AppError response
async fn error_response(error: AppError) -> (StatusCode, String) {
    let response = error.into_response();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_database_error_response_hides_details() {
    let error = AppError::Database(anyhow::anyhow!("connection refused"));
    let (status, body) = error_response(error).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Internal server error"));
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn test_not_found_response() {
    let (status, body) = error_response(AppError::NotFound).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Page not found"));
}

#[tokio::test]
async fn test_forbidden_response() {
    let (status, body) = error_response(AppError::Forbidden).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("permission"));
}

#[tokio::test]
async fn test_bad_request_message_is_escaped() {
    let (status, body) = error_response(AppError::BadRequest("<b>bad</b>".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("&lt;b&gt;bad&lt;/b&gt;"));
}

#[tokio::test]
async fn test_login_required_redirects() {
    let response = AppError::LoginRequired("/post/new/".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(LOCATION).unwrap(),
        "/login/?next=%2Fpost%2Fnew%2F"
    );
}

#[test]
fn test_page_errors_become_not_found() {
    assert!(matches!(AppError::from(PageError::EmptyPage), AppError::NotFound));
    assert!(matches!(AppError::from(PageError::InvalidPage), AppError::NotFound));
}
