use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;
use sotd_schema::{spotify::SearchResponse, SearchTrack};

use crate::{config::join_segments, error::ApiError, upstream, AppState};

const FAILED: &str = "Failed to search Spotify";
const SEARCH_LIMIT: &str = "10";

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub tracks: Vec<SearchTrack>,
}

/// Track search on Spotify with the caller's own token.
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<SearchResults>, ApiError> {
    let session = state
        .sessions
        .resolve(&headers)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let query = params
        .ok()
        .and_then(|Query(pairs)| first_value(pairs, "q"))
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::MissingQuery)?;

    let token = session.token().ok_or(ApiError::MissingToken)?;

    let url = join_segments(&state.config.spotify.api_url, &["search"]);
    tracing::debug!("searching spotify for {:?}", query);

    let response = state
        .http
        .get(url)
        .bearer_auth(token)
        .query(&[("q", query.as_str()), ("type", "track"), ("limit", SEARCH_LIMIT)])
        .send()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    if !response.status().is_success() {
        return Err(upstream::relay_error("Spotify API error", response).await);
    }

    let data: SearchResponse = response
        .json()
        .await
        .map_err(|e| ApiError::internal(FAILED, e))?;

    let tracks = data.tracks.items.iter().map(SearchTrack::from).collect();

    Ok(Json(SearchResults { tracks }))
}

/// The first value given for `key`; later repeats are ignored.
fn first_value(pairs: Vec<(String, String)>, key: &str) -> Option<String> {
    pairs.into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}
