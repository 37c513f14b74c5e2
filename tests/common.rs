#![allow(dead_code)]
/// Common test utilities for blogpress integration tests
///
/// This file contains the test application setup and helpers for sending
/// requests, building form bodies and logging in.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use blogpress::{
    create_app,
    db::{init_pool, DbPool},
    models::{NewPost, Post, User, Visibility},
    repo, run_migrations, AppState, SiteSettings,
};
use serde::Serialize;
use std::sync::Arc;
use tempfile::TempDir;
use tower::Service;

pub const PASSWORD: &str = "integration-pass";

const BOUNDARY: &str = "----blogpress-test-boundary";

/// A router with its own in-memory database and media directory
pub struct TestApp {
    pub app: Router,
    pub pool: Arc<DbPool>,
    pub media: TempDir,
}

/// Creates a test application with an in-memory SQLite database
///
/// Each call gets its own shared-cache database so the pool's connections
/// see one schema while tests stay isolated.
pub fn create_test_app() -> TestApp {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(init_pool(&database_url).unwrap());
    run_migrations(&mut pool.get().unwrap()).unwrap();

    let media = tempfile::tempdir().unwrap();
    let settings = SiteSettings {
        media_dir: media.path().to_path_buf(),
        session_ttl: chrono::Duration::hours(1),
    };

    TestApp {
        app: create_app(AppState::new(pool.clone(), settings)),
        pool,
        media,
    }
}

impl TestApp {
    pub async fn send(&mut self, request: Request<Body>) -> Response {
        self.app.call(request).await.unwrap()
    }

    pub async fn get(&mut self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri).method("GET");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POSTs an urlencoded form
    pub async fn post_form<T: Serialize>(&mut self, uri: &str, cookie: Option<&str>, form: &T) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = serde_html_form::to_string(form).unwrap();
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// POSTs a multipart form with text fields and an optional file
    pub async fn post_multipart(
        &mut self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = multipart_body(fields, file);
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Creates an account directly in the database
    pub fn create_user(&self, username: &str) -> User {
        repo::create_user(&self.pool, username, "", PASSWORD).unwrap()
    }

    /// Logs in through the login form and returns the `Cookie` header value
    pub async fn login(&mut self, username: &str) -> String {
        let response = self
            .post_form(
                "/login/",
                None,
                &[("username", username), ("password", PASSWORD)],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login did not set a session cookie")
    }

    /// Creates an account and logs it in
    pub async fn user_with_session(&mut self, username: &str) -> (User, String) {
        let user = self.create_user(username);
        let cookie = self.login(username).await;
        (user, cookie)
    }

    /// Inserts a post directly, `minutes` after a fixed start time
    pub fn create_post(&self, author: &User, visibility: Visibility, title: &str, tags: &[&str], minutes: i64) -> Post {
        let posted = chrono::DateTime::from_timestamp(1_714_564_800 + minutes * 60, 0).unwrap();
        let new_post = NewPost::new(author.get_id(), visibility, title.to_string(), format!("Body of {title}"), None)
            .posted_at(posted);
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        repo::create_post(&self.pool, new_post, &tags).unwrap()
    }
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some((name, filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The `sessionid=...` pair from a Set-Cookie header, if any
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .find(|pair| pair.starts_with("sessionid=") && pair.len() > "sessionid=".len())
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("response has no Location header")
        .to_str()
        .unwrap()
        .to_string()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
