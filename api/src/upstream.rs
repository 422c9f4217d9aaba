//! Outbound calls to the upstream API and the reshaping-free parts of relaying
//! their answers.

use axum::{
    http::{header::ACCEPT, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::{Client, ClientBuilder, RequestBuilder, Url};
use serde_json::Value;

use crate::{config::Config, error::ApiError, AppState};

pub const API_ERROR: &str = "API error";

fn builder() -> ClientBuilder {
    Client::builder().user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
}

/// Client for the session lookup and Spotify, always with certificate checks.
pub fn build_client() -> reqwest::Result<Client> {
    builder().build()
}

/// Outside production the upstream API may sit behind a self-signed
/// certificate. Nothing else gets this relaxation.
pub fn accepts_invalid_certs(config: &Config) -> bool {
    !config.is_production()
}

/// Client for calls to the upstream API.
pub fn build_upstream_client(config: &Config) -> reqwest::Result<Client> {
    if !accepts_invalid_certs(config) {
        return build_client();
    }

    tracing::warn!(
        "accepting invalid TLS certificates from the upstream API ({:?})",
        config.app_env
    );
    builder().danger_accept_invalid_certs(true).build()
}

impl AppState {
    pub fn upstream_url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        self.config
            .upstream_url(segments)
            .ok_or(ApiError::Configuration)
    }
}

fn with_bearer(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

pub async fn get(
    client: &Client,
    url: Url,
    token: Option<&str>,
) -> reqwest::Result<reqwest::Response> {
    tracing::debug!("forwarding GET {}", url);
    with_bearer(client.get(url), token)
        .header(ACCEPT, "application/json")
        .send()
        .await
}

pub async fn post_json(
    client: &Client,
    url: Url,
    token: Option<&str>,
    body: &Value,
) -> reqwest::Result<reqwest::Response> {
    tracing::debug!("forwarding POST {}", url);
    with_bearer(client.post(url), token)
        .header(ACCEPT, "application/json")
        .json(body)
        .send()
        .await
}

/// Reads a JSON body. An empty body is not JSON and fails like any other
/// malformed one.
pub async fn read_json(response: reqwest::Response) -> anyhow::Result<(StatusCode, Value)> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let value = serde_json::from_slice(&bytes)?;

    Ok((status, value))
}

/// Converts a failed upstream response into the relayed error, logging the
/// upstream body since the caller only sees the generic message.
pub async fn relay_error(label: &str, response: reqwest::Response) -> ApiError {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();

    tracing::warn!("upstream error ({}) from {}: {}", status, url, body);

    ApiError::upstream(label, status)
}

/// Relays a response unchanged: success status and JSON body, or the mapped
/// error. `failed` is the generic message for transport and decode failures.
pub async fn relay(
    response: reqwest::Response,
    failed: &'static str,
) -> Result<Response, ApiError> {
    if !response.status().is_success() {
        return Err(relay_error(API_ERROR, response).await);
    }

    let (status, data) = read_json(response)
        .await
        .map_err(|e| ApiError::internal(failed, e))?;

    Ok((status, Json(data)).into_response())
}
