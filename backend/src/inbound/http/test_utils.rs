//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::web;

use super::state::{HttpState, HttpStatePorts};
use crate::domain::test_support::{
    InMemoryFavoriteRepository, InMemoryUserRepository, StubPasswordHasher, StubRecipeSource,
};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state over in-memory ports and an empty recipe source.
pub fn test_app_state() -> web::Data<HttpState> {
    test_app_state_with_source(Arc::new(StubRecipeSource::default()))
}

/// Handler state over in-memory ports and a scripted recipe source.
pub fn test_app_state_with_source(source: Arc<StubRecipeSource>) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(HttpStatePorts {
        users: Arc::new(InMemoryUserRepository::default()),
        favorites: Arc::new(InMemoryFavoriteRepository::default()),
        source,
        hasher: Arc::new(StubPasswordHasher),
    }))
}
