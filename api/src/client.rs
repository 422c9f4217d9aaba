//! Typed client for the gateway's own JSON API, carrying the browser session
//! cookie. The page state machines and `sotdcli` are built on it.

use axum::http::{header::COOKIE, StatusCode};
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use sotd_schema::{NewSotd, Profile, SearchTrack, SotdEntries, SotdEntry, Track, WeeklyStatistics};
use thiserror::Error;

use crate::config::join_segments;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found")]
    NotFound,

    #[error("request timed out")]
    Timeout,

    #[error("{message} ({status})")]
    Status { status: StatusCode, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    tracks: Vec<SearchTrack>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    cookie: Option<String>,
}

impl ApiClient {
    pub fn new(base: Url, cookie: Option<String>) -> Self {
        Self::with_client(Client::new(), base, cookie)
    }

    pub fn with_client(http: Client, base: Url, cookie: Option<String>) -> Self {
        Self { http, base, cookie }
    }

    fn url(&self, segments: &[&str]) -> Url {
        join_segments(&self.base, segments)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound);
        }
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Status { status, message });
        }

        Ok(response.json().await?)
    }

    pub async fn profile(&self, user_id: &str) -> Result<Profile, ClientError> {
        self.send(self.http.get(self.url(&["api", "user", user_id])))
            .await
    }

    /// All weeks upstream knows about; a single object is read as one week.
    pub async fn weekly_statistics(
        &self,
        user_id: &str,
    ) -> Result<Vec<WeeklyStatistics>, ClientError> {
        let url = self.url(&["api", "user", user_id, "statistics", "weekly"]);
        let data: Value = self.send(self.http.get(url)).await?;

        Ok(match data {
            Value::Null => Vec::new(),
            Value::Array(_) => serde_json::from_value(data)?,
            other => vec![serde_json::from_value(other)?],
        })
    }

    pub async fn sotds(&self, user_id: &str) -> Result<SotdEntries, ClientError> {
        self.send(self.http.get(self.url(&["api", "user", user_id, "sotds"])))
            .await
    }

    /// The pick for `date`. `Ok(None)` when upstream answers with an empty
    /// body or list, `Err(NotFound)` on 404.
    pub async fn sotd_for_date(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<SotdEntry>, ClientError> {
        let date = date.format("%Y-%m-%d").to_string();
        let url = self.url(&["api", "user", user_id, "sotds", &date]);
        let data: Value = self.send(self.http.get(url)).await?;

        Ok(match data {
            Value::Null => None,
            Value::Array(items) => items
                .into_iter()
                .next()
                .map(serde_json::from_value)
                .transpose()?,
            other => Some(serde_json::from_value(other)?),
        })
    }

    /// Recommendations as served by the gateway: `{tracks: [...]}`, a bare
    /// array, or the empty `{items: []}` placeholder.
    pub async fn recommended(&self, user_id: &str) -> Result<Vec<Track>, ClientError> {
        let url = self.url(&["api", "user", user_id, "sotds", "recommended"]);
        let data: Value = self.send(self.http.get(url)).await?;

        let tracks = match data {
            Value::Object(mut map) => match map.remove("tracks") {
                Some(Value::Array(tracks)) => tracks,
                _ => Vec::new(),
            },
            Value::Array(tracks) => tracks,
            _ => Vec::new(),
        };

        Ok(tracks
            .into_iter()
            .filter(|t| !t.is_null())
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()?)
    }

    pub async fn create_sotd(&self, user_id: &str, sotd: &NewSotd) -> Result<Value, ClientError> {
        let url = self.url(&["api", "user", user_id, "sotds"]);
        self.send(self.http.post(url).json(sotd)).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchTrack>, ClientError> {
        let url = self.url(&["api", "spotify", "search"]);
        let results: SearchResults = self.send(self.http.get(url).query(&[("q", query)])).await?;
        Ok(results.tracks)
    }
}
