//! Application configuration loaded from the environment.
//!
//! Configuration errors are fatal and surface before any network call: a
//! missing recipe API credential or database URL stops startup rather than
//! failing the first request.

use std::net::SocketAddr;

use actix_web::cookie::Key;
use tracing::warn;
use url::Url;

use crate::domain::DEFAULT_RESULT_CAP;

const DEFAULT_API_BASE_URL: &str = "https://api.spoonacular.com";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("required environment variable {name} is not set")]
    MissingVar { name: &'static str },

    /// A variable is present but unparseable.
    #[error("environment variable {name} is invalid: {message}")]
    InvalidVar {
        name: &'static str,
        message: String,
    },

    /// The session signing key could not be loaded.
    #[error("failed to read session key: {message}")]
    SessionKey { message: String },
}

/// Typed application configuration.
pub struct AppConfig {
    /// Recipe API credential; passed as a query parameter on every call.
    pub api_key: String,
    /// Recipe API base URL.
    pub api_base_url: Url,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Session cookie signing key.
    pub session_key: Key,
    /// Whether session cookies require HTTPS.
    pub cookie_secure: bool,
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Cap on search results before detail enrichment.
    pub result_cap: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key)
            .field("api_base_url", &self.api_base_url)
            .field("database_url", &self.database_url)
            .field("session_key", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("bind_addr", &self.bind_addr)
            .field("result_cap", &self.result_cap)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Fails when `RECIPE_API_KEY` or `DATABASE_URL` is missing, a value
    /// does not parse, or the session key cannot be obtained.
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let session_key = load_session_key(&lookup)?;
        Self::from_lookup(&lookup, session_key)
    }

    fn from_lookup(
        vars: &dyn Fn(&str) -> Option<String>,
        session_key: Key,
    ) -> Result<Self, ConfigError> {
        let api_key = vars("RECIPE_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar {
                name: "RECIPE_API_KEY",
            })?;
        let database_url = vars("DATABASE_URL").ok_or(ConfigError::MissingVar {
            name: "DATABASE_URL",
        })?;

        let api_base_url = vars("RECIPE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = Url::parse(&api_base_url).map_err(|err| ConfigError::InvalidVar {
            name: "RECIPE_API_BASE_URL",
            message: err.to_string(),
        })?;

        let bind_addr = vars("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::InvalidVar {
            name: "BIND_ADDR",
            message: format!("{bind_addr} is not a socket address"),
        })?;

        let result_cap = match vars("SEARCH_RESULT_CAP") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
                name: "SEARCH_RESULT_CAP",
                message: format!("{raw} is not a positive integer"),
            })?,
            None => DEFAULT_RESULT_CAP,
        };

        let cookie_secure = vars("SESSION_COOKIE_SECURE").map(|v| v != "0").unwrap_or(true);

        Ok(Self {
            api_key,
            api_base_url,
            database_url,
            session_key,
            cookie_secure,
            bind_addr,
            result_cap,
        })
    }
}

/// Load the session signing key from `SESSION_KEY_FILE`.
///
/// Debug builds (or `SESSION_ALLOW_EPHEMERAL=1`) fall back to a generated
/// key so local runs need no secret material; release builds fail hard.
fn load_session_key(vars: &dyn Fn(&str) -> Option<String>) -> Result<Key, ConfigError> {
    let key_path =
        vars("SESSION_KEY_FILE").unwrap_or_else(|| DEFAULT_SESSION_KEY_FILE.to_owned());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            let allow_dev = vars("SESSION_ALLOW_EPHEMERAL").as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(ConfigError::SessionKey {
                    message: format!("{key_path}: {err}"),
                })
            }
        }
    }
}
