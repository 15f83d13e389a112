//! Backend entry-point: load configuration and serve the REST API.

use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::server::config::AppConfig;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    // Configuration failures (missing credential, bad addresses) are fatal
    // before any network call.
    let config = AppConfig::from_env()
        .map_err(|err| std::io::Error::other(format!("configuration error: {err}")))?;

    backend::server::run(config).await
}
