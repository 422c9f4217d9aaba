//! Session gate in front of the page routes.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{session::Session, AppState};

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Continue,
    Redirect(String),
}

pub fn profile_path(user_id: &str) -> String {
    format!("/profile/{}", user_id)
}

/// Only the root and the profile pages are gated; the auth pages never are.
pub fn is_gated(path: &str) -> bool {
    if path.starts_with("/auth/") {
        return false;
    }
    path == "/" || path == "/profile" || path.starts_with("/profile/")
}

pub fn decide(path: &str, session: Option<&Session>) -> GateDecision {
    if !is_gated(path) {
        return GateDecision::Continue;
    }

    match session {
        None => GateDecision::Redirect(LOGIN_PATH.to_string()),
        Some(session) if path == "/" => GateDecision::Redirect(profile_path(session.user_id())),
        Some(_) => GateDecision::Continue,
    }
}

pub async fn session_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    if !is_gated(&path) {
        return next.run(request).await;
    }

    let session = state.sessions.resolve(request.headers()).await;

    match decide(&path, session.as_ref()) {
        GateDecision::Continue => next.run(request).await,
        GateDecision::Redirect(to) => {
            tracing::debug!("gate redirecting {} to {}", path, to);
            Redirect::temporary(&to).into_response()
        }
    }
}

/// Post-login landing: send the caller to their own profile.
pub async fn auth_redirect(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    match state.sessions.resolve(&headers).await {
        Some(session) => Redirect::temporary(&profile_path(session.user_id())),
        None => Redirect::temporary(LOGIN_PATH),
    }
}
