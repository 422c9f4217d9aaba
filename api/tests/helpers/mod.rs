//! Shared fixtures: mock auth service and upstreams, and a router driven
//! in-process with `oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use reqwest::Url;
use serde_json::{json, Value};
use sotd_api::{
    config::{AuthConfig, Config, SpotifyConfig},
    AppState,
};
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};
use tower::ServiceExt;
use wiremock::{
    matchers::{header as header_matcher, method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const COOKIE: &str = "better-auth.session_token=abc123";
pub const TOKEN: &str = "session-token";

pub fn session_json(user_id: &str) -> Value {
    json!({
        "user": {"id": user_id, "name": "John Doe", "email": "john@example.com"},
        "session": {"token": TOKEN, "userId": user_id, "expiresAt": "2999-01-01T00:00:00Z"}
    })
}

/// Auth service answering the session lookup for our test cookie with
/// `session` (`None` answers `null`).
pub async fn auth_server(session: Option<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/get-session"))
        .and(header_matcher("cookie", COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_json(session.unwrap_or(Value::Null)))
        .with_priority(1)
        .mount(&server)
        .await;
    // anything else (no cookie, other cookie) has no session
    Mock::given(method("GET"))
        .and(path("/api/auth/get-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;
    server
}

pub async fn signed_in(user_id: &str) -> MockServer {
    auth_server(Some(session_json(user_id))).await
}

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// A fresh static root per app, so concurrent tests never see a half-written
/// index.html.
pub fn static_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sotd-api-static-{}-{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<!doctype html><div id=app></div>").unwrap();
    dir
}

pub struct TestApp {
    pub auth: MockServer,
    pub config: Config,
}

impl TestApp {
    pub fn new(auth: MockServer) -> Self {
        let config = Config {
            auth: AuthConfig {
                base_url: Url::parse(&auth.uri()).unwrap(),
                secret: None,
            },
            static_dir: static_dir(),
            ..Config::default()
        };
        Self { auth, config }
    }

    pub fn with_upstream(mut self, upstream: &MockServer) -> Self {
        self.config.api_url = Some(Url::parse(&upstream.uri()).unwrap());
        self
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.config.api_url = Some(Url::parse(url).unwrap());
        self
    }

    pub fn with_spotify(mut self, spotify: &MockServer) -> Self {
        self.config.spotify = SpotifyConfig {
            api_url: Url::parse(&format!("{}/v1", spotify.uri())).unwrap(),
            ..self.config.spotify.clone()
        };
        self
    }

    pub fn router(&self) -> Router {
        sotd_api::app(AppState::new(self.config.clone()).unwrap())
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body: bytes.to_vec(),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, COOKIE)
        .body(Body::empty())
        .unwrap()
}

pub fn get_anonymous(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, COOKIE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}
