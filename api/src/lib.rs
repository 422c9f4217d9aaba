use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod profile;
pub mod profile_page;
pub mod recap;
pub mod select_sotd;
pub mod session;
pub mod sotd;
pub mod spotify;
pub mod statistics;
pub mod upstream;

use config::Config;
use session::SessionClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Session lookups and Spotify.
    pub http: reqwest::Client,
    /// The upstream API only; may accept invalid certificates outside production.
    pub upstream: reqwest::Client,
    pub sessions: SessionClient,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = upstream::build_client()?;
        let upstream = upstream::build_upstream_client(&config)?;
        let sessions = SessionClient::new(http.clone(), &config.auth.base_url);

        Ok(Self {
            config: Arc::new(config),
            http,
            upstream,
            sessions,
        })
    }
}

async fn health_check() -> &'static str {
    "ok"
}

pub fn app(state: AppState) -> Router {
    let static_dir = &state.config.static_dir;
    let pages = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/redirect", get(gate::auth_redirect))
        .route("/api/spotify/search", get(spotify::search))
        .route("/api/user/:user_id", get(profile::get_profile))
        .route("/api/user/:user_id/sotds", get(sotd::list).post(sotd::create))
        .route("/api/user/:user_id/sotds/recommended", get(sotd::recommended))
        .route(
            "/api/user/:user_id/sotds/:date",
            get(sotd::get_for_date).post(sotd::save_for_date),
        )
        .route(
            "/api/user/:user_id/statistics/weekly",
            get(statistics::weekly),
        )
        .fallback_service(pages)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::session_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sotd_api=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::debug!("loaded configuration: {:?}", config);

    if config.api_url.is_none() {
        tracing::warn!("API_URL not set, user endpoints will answer with a configuration error");
    }

    let addr = config.bind_addr;
    let state = AppState::new(config)?;
    let app = app(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
