use axum::{
    extract::{rejection::PathRejection, Path},
    http::{header::COOKIE, HeaderMap},
};
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{config::join_segments, error::ApiError};

const SESSION_PATH: [&str; 3] = ["api", "auth", "get-session"];

/// Caller identity as reported by the auth service.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    #[serde(default)]
    pub session: SessionInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref().filter(|t| !t.is_empty())
    }

    fn is_expired(&self) -> bool {
        self.session
            .expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

/// Session required, and it must belong to the user named in the path.
pub fn authorize(session: Option<Session>, user_id: &str) -> Result<Session, ApiError> {
    match session {
        Some(session) if session.user_id() == user_id => Ok(session),
        Some(session) => {
            tracing::debug!(
                "session user {} tried to access user {}",
                session.user_id(),
                user_id
            );
            Err(ApiError::Unauthorized)
        }
        None => Err(ApiError::Unauthorized),
    }
}

/// Path parameters of a user-scoped route, looked at only once the caller has
/// a session. A path that fails to decode cannot name the caller, so it is
/// refused the same way as someone else's user id.
pub fn path_params<T>(
    session: Option<&Session>,
    path: Result<Path<T>, PathRejection>,
) -> Result<T, ApiError> {
    if session.is_none() {
        return Err(ApiError::Unauthorized);
    }

    match path {
        Ok(Path(params)) => Ok(params),
        Err(e) => {
            tracing::debug!("rejected path parameters: {}", e);
            Err(ApiError::Unauthorized)
        }
    }
}

/// Resolves sessions by forwarding the caller's cookie to the auth service.
#[derive(Clone)]
pub struct SessionClient {
    http: Client,
    endpoint: Url,
}

impl SessionClient {
    pub fn new(http: Client, auth_base: &Url) -> Self {
        Self {
            http,
            endpoint: join_segments(auth_base, &SESSION_PATH),
        }
    }

    /// Any failure to introspect counts as "no session".
    pub async fn resolve(&self, headers: &HeaderMap) -> Option<Session> {
        let cookie = headers
            .get(COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        match self.fetch(cookie).await {
            Ok(Some(session)) if session.is_expired() => {
                tracing::debug!("session for {} has expired", session.user_id());
                None
            }
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("session lookup failed: {:#}", e);
                None
            }
        }
    }

    async fn fetch(&self, cookie: &str) -> anyhow::Result<Option<Session>> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(COOKIE, cookie)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("session endpoint answered {}", response.status());
            return Ok(None);
        }

        // a missing session comes back as a JSON `null`
        Ok(response.json::<Option<Session>>().await?)
    }
}
