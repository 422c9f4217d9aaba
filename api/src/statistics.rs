use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::ApiError,
    session::{authorize, path_params},
    upstream, AppState,
};

const FAILED: &str = "Failed to fetch statistics";

/// Weekly recaps. No statistics yet is a normal state, so upstream 404 reads
/// as an empty list. Only an exact 200 counts as success here.
pub async fn weekly(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session = state.sessions.resolve(&headers).await;
    let user_id = path_params(session.as_ref(), path)?;
    let session = authorize(session, &user_id)?;
    let url = state.upstream_url(&["user", &user_id, "statistics", "weekly"])?;

    let response = upstream::get(&state.upstream, url, session.token())
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    match response.status() {
        StatusCode::NOT_FOUND => Ok(Json(json!([])).into_response()),
        StatusCode::OK => {
            let (_, data) = upstream::read_json(response)
                .await
                .map_err(|e| ApiError::internal(FAILED, e))?;
            Ok(Json(data).into_response())
        }
        _ => Err(upstream::relay_error(upstream::API_ERROR, response).await),
    }
}
