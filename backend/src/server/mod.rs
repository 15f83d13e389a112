//! Server assembly: adapter construction, migrations, and the HTTP app.

pub mod config;

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::{favorites, recipes, search, users};
use crate::outbound::persistence::{
    DbPool, DieselFavoriteRepository, DieselUserRepository, PoolConfig,
};
use crate::outbound::recipes::RecipeHttpSource;
use crate::outbound::security::Argon2PasswordHasher;
#[cfg(debug_assertions)]
use crate::ApiDoc;

use self::config::AppConfig;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply pending migrations over a short-lived synchronous connection.
fn run_migrations(database_url: &str) -> Result<(), std::io::Error> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    Ok(())
}

fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Wire adapters, run migrations, and serve until shutdown.
///
/// # Errors
///
/// Propagates adapter construction, migration, and bind failures as
/// `std::io::Error` so `main` can exit non-zero.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let source = RecipeHttpSource::new(config.api_base_url.clone(), config.api_key.clone())
        .map_err(|err| std::io::Error::other(format!("recipe source setup failed: {err}")))?;

    let database_url = config.database_url.clone();
    tokio::task::spawn_blocking(move || run_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))??;

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("pool setup failed: {err}")))?;

    let state = web::Data::new(HttpState::with_result_cap(
        HttpStatePorts {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            favorites: Arc::new(DieselFavoriteRepository::new(pool)),
            source: Arc::new(source),
            hasher: Arc::new(Argon2PasswordHasher::new()),
        },
        config.result_cap,
    ));

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(session_middleware(key.clone(), cookie_secure))
            .service(users::signup)
            .service(users::login)
            .service(users::logout)
            .service(users::home)
            .service(users::profile)
            .service(search::search)
            .service(search::cached_results)
            .service(search::more_recipes)
            .service(favorites::list_favorites)
            .service(favorites::add_favorite)
            .service(favorites::remove_favorite)
            .service(recipes::recipe_detail);

        let app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "server listening");
    server.run().await
}
