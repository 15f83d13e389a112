//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FavoriteRepository, PasswordHasher, RecipeSource, UserRepository};
use crate::domain::{AccountService, FavoritesService, RecipeSearchService, DEFAULT_RESULT_CAP};

/// Parameter object bundling the port implementations handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub source: Arc<dyn RecipeSource>,
    pub hasher: Arc<dyn PasswordHasher>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub search: RecipeSearchService,
    pub favorites: FavoritesService,
    pub source: Arc<dyn RecipeSource>,
}

impl HttpState {
    /// Construct state from a ports bundle with the default result cap.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_result_cap(ports, DEFAULT_RESULT_CAP)
    }

    /// Construct state with an explicit search result cap.
    pub fn with_result_cap(ports: HttpStatePorts, result_cap: usize) -> Self {
        let HttpStatePorts {
            users,
            favorites,
            source,
            hasher,
        } = ports;
        Self {
            accounts: AccountService::new(users, hasher),
            search: RecipeSearchService::with_result_cap(source.clone(), result_cap),
            favorites: FavoritesService::new(favorites, source.clone()),
            source,
        }
    }
}
