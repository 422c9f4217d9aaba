//! Process configuration, read once at startup.
//!
//! Every value comes from the environment (after `.env` has been loaded by
//! the binary). Empty values count as unset. Required values fail fast unless
//! `SKIP_ENV_VALIDATION` is set, in which case they degrade to empty and the
//! affected endpoints report a configuration error per request instead.

use reqwest::Url;
use std::{fmt, net::SocketAddr, path::PathBuf, str::FromStr};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_AUTH_URL: &str = "http://localhost:3000";
const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_STATIC_DIR: &str = "./public";
const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid {key} '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Test,
    Production,
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(AppEnv::Development),
            "test" => Ok(AppEnv::Test),
            "production" => Ok(AppEnv::Production),
            other => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: other.to_string(),
                reason: "expected development, test or production".to_string(),
            }),
        }
    }
}

/// A value that must never end up in logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base of the auth service answering `/api/auth/get-session`.
    pub base_url: Url,
    pub secret: Option<Secret>,
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: Secret,
    pub api_url: Url,
}

/// Connection parameters of the auth service's database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: Secret,
    pub schema: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnv,
    pub bind_addr: SocketAddr,
    /// Upstream API base. `None` only when validation was skipped.
    pub api_url: Option<Url>,
    pub auth: AuthConfig,
    pub spotify: SpotifyConfig,
    pub database: DatabaseConfig,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_env: AppEnv::default(),
            bind_addr: DEFAULT_BIND_ADDR.parse().expect("valid default bind address"),
            api_url: None,
            auth: AuthConfig {
                base_url: Url::parse(DEFAULT_AUTH_URL).expect("valid default auth url"),
                secret: None,
            },
            spotify: SpotifyConfig {
                client_id: String::new(),
                client_secret: Secret::default(),
                api_url: Url::parse(DEFAULT_SPOTIFY_API_URL).expect("valid default spotify url"),
            },
            database: DatabaseConfig {
                port: DEFAULT_DB_PORT,
                ..DatabaseConfig::default()
            },
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let validate = var("SKIP_ENV_VALIDATION").is_none();
        let required = |key: &'static str| match var(key) {
            Some(value) => Ok(value),
            None if validate => Err(ConfigError::Missing(key)),
            None => Ok(String::new()),
        };

        let app_env = var("APP_ENV")
            .map(|v| v.parse::<AppEnv>())
            .transpose()?
            .unwrap_or_default();

        let bind_addr = parse_value(
            "BIND_ADDR",
            &var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        )?;

        let api_url = match var("API_URL") {
            Some(value) => Some(parse_url("API_URL", &value)?),
            None if validate => return Err(ConfigError::Missing("API_URL")),
            None => None,
        };

        let auth_url = var("AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let auth_url = if auth_url.starts_with("http") {
            auth_url
        } else {
            format!("https://{}", auth_url)
        };
        let auth_secret = var("AUTH_SECRET").map(Secret::new);
        if auth_secret.is_none() && validate && app_env == AppEnv::Production {
            return Err(ConfigError::Missing("AUTH_SECRET"));
        }

        let spotify = SpotifyConfig {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: Secret::new(required("SPOTIFY_CLIENT_SECRET")?),
            api_url: parse_url(
                "SPOTIFY_API_URL",
                &var("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            )?,
        };

        let port = required("DB_PORT")?;
        let database = DatabaseConfig {
            host: required("DB_HOST")?,
            port: if port.is_empty() {
                DEFAULT_DB_PORT
            } else {
                parse_value("DB_PORT", &port)?
            },
            database: required("DB_DATABASE")?,
            username: required("DB_USERNAME")?,
            password: Secret::new(required("DB_PASSWORD")?),
            schema: required("DB_SCHEMA")?,
        };

        Ok(Self {
            app_env,
            bind_addr,
            api_url,
            auth: AuthConfig {
                base_url: parse_url("AUTH_URL", &auth_url)?,
                secret: auth_secret,
            },
            spotify,
            database,
            static_dir: var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    /// Upstream URL for the given path segments, if a base is configured.
    pub fn upstream_url(&self, segments: &[&str]) -> Option<Url> {
        self.api_url
            .as_ref()
            .map(|base| join_segments(base, segments))
    }
}

/// Appends percent-encoded path segments to `base`, keeping any base path.
pub fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn parse_url(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = parse_value::<Url>(key, value)?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "not a base url".to_string(),
        });
    }
    Ok(url)
}

fn parse_value<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
