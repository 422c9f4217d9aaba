use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::HeaderMap,
    response::Response,
};

use crate::{
    error::ApiError,
    session::{authorize, path_params},
    upstream, AppState,
};

const FAILED: &str = "Failed to fetch profile";

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = state.sessions.resolve(&headers).await;
    let user_id = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id])?;

    let response = upstream::get(&state.upstream, url, session.token())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    upstream::relay(response, FAILED).await
}
