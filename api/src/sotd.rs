use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    session::{authorize, path_params},
    upstream, AppState,
};

/// A user's full history. No picks yet reads as an empty history.
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    const FAILED: &str = "Failed to fetch SOTDs";

    let session = state.sessions.resolve(&headers).await;
    let user_id = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id, "sotds"])?;

    let response = upstream::get(&state.upstream, url, session.token())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(Json(json!({ "entries": {} })).into_response());
    }

    upstream::relay(response, FAILED).await
}

pub async fn create(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    const FAILED: &str = "Failed to create SOTD";

    let session = state.sessions.resolve(&headers).await;
    let user_id = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id, "sotds"])?;
    let body = body.map_err(|e| ApiError::internal(FAILED, e))?;
    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::internal(FAILED, e))?;

    let response = upstream::post_json(&state.upstream, url, session.token(), &payload)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    upstream::relay(response, FAILED).await
}

/// The pick for one date. Unlike the history, a missing pick is a real 404:
/// the profile page uses it to tell "not picked yet" from a failure.
pub async fn get_for_date(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    const FAILED: &str = "Failed to fetch Song of the Day";

    let session = state.sessions.resolve(&headers).await;
    let (user_id, date) = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id, "sotds", &date])?;

    let response = upstream::get(&state.upstream, url, session.token())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound("No SOTD found for this date"));
    }

    upstream::relay(response, FAILED).await
}

pub async fn save_for_date(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    const FAILED: &str = "Failed to save Song of the Day";

    let session = state.sessions.resolve(&headers).await;
    let (user_id, date) = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id, "sotds", &date])?;
    let body = body.map_err(|e| ApiError::internal(FAILED, e))?;
    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::internal(FAILED, e))?;

    let response = upstream::post_json(&state.upstream, url, session.token(), &payload)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    upstream::relay(response, FAILED).await
}

/// Tracks suggested for today's pick. Nothing to recommend yet is a normal
/// state, so upstream 404 reads as an empty list.
pub async fn recommended(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    const FAILED: &str = "Failed to fetch recommended tracks";

    let session = state.sessions.resolve(&headers).await;
    let user_id = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id, "sotds", "recommended"])?;

    let response = upstream::get(&state.upstream, url, session.token())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(Json(json!({ "items": [] })).into_response());
    }
    if !response.status().is_success() {
        return Err(upstream::relay_error(upstream::API_ERROR, response).await);
    }

    let (status, data) = upstream::read_json(response)
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    let data = reshape_recommended(data).ok_or_else(|| {
        ApiError::internal(FAILED, anyhow::anyhow!("recommendations body was null"))
    })?;

    Ok((status, Json(data)).into_response())
}

/// Presents recommendations as `{tracks: [...]}` whichever shape upstream used:
/// a Spotify-style `{items: [{track}]}` envelope has its tracks pulled out in
/// order, a bare array is wrapped, and any other object passes through.
pub fn reshape_recommended(data: Value) -> Option<Value> {
    match data {
        Value::Null => None,
        Value::Array(tracks) => Some(json!({ "tracks": tracks })),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => {
                let tracks: Vec<Value> = items
                    .into_iter()
                    .map(|mut item| item.get_mut("track").map(Value::take).unwrap_or(Value::Null))
                    .collect();
                Some(json!({ "tracks": tracks }))
            }
            Some(other) => {
                map.insert("items".to_string(), other);
                Some(Value::Object(map))
            }
            None => Some(Value::Object(map)),
        },
        other => Some(other),
    }
}
