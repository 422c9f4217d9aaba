use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything a proxy handler can answer with besides success.
///
/// The rendered body is always `{"error": <message>}`; internal causes are
/// logged, never sent to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("No authentication token found")]
    MissingToken,

    #[error("Search query is required")]
    MissingQuery,

    #[error("Server configuration error")]
    Configuration,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    /// Relay an upstream failure status under a generic message.
    pub fn upstream(label: &str, status: StatusCode) -> Self {
        ApiError::Upstream {
            status,
            message: format!("{}: {}", label, status.canonical_reason().unwrap_or("Unknown")),
        }
    }

    /// Any failure on our side of the call, answered as a 500 with `message`.
    pub fn internal(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            message,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::MissingQuery => StatusCode::BAD_REQUEST,
            ApiError::Configuration | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal { message, source } => {
                tracing::error!("{}: {:#}", message, source);
            }
            ApiError::Configuration => {
                tracing::error!("API_URL is not configured");
            }
            _ => {}
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_uses_reason_phrase() {
        let err = ApiError::upstream("API error", StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "API error: Service Unavailable");
    }

    #[test]
    fn internal_hides_source() {
        let err = ApiError::internal(
            "Failed to fetch profile",
            anyhow::anyhow!("connection reset"),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to fetch profile");
    }

    #[test]
    fn fixed_statuses() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingQuery.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Configuration.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::NotFound("No SOTD found for this date").status(),
            StatusCode::NOT_FOUND
        );
    }
}
