//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: persisting a user id and caching the most
//! recent search result set between the search and detail pages.
//!
//! The cache stores a reduced projection per recipe, not the full payload;
//! the whole session rides in one cookie with a ~4 KB budget. A new search
//! overwrites the previous result set, and clearing is explicit.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, RecipeSummary, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const RESULTS_KEY: &str = "search_results";
pub(crate) const PARAMS_KEY: &str = "search_params";

/// The cached result set: reduced projections plus the fallback marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CachedResults {
    pub recipes: Vec<RecipeSummary>,
    pub fallback: bool,
}

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated user's id in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current user id from the session, if present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let id = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match UserId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid user id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated user id or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session entry, ending the login and the result cache.
    pub fn purge(&self) {
        self.0.purge();
    }

    /// Overwrite the cached result set with a fresh one.
    pub fn store_results(&self, results: &CachedResults) -> Result<(), Error> {
        self.0
            .insert(RESULTS_KEY, results)
            .map_err(|error| Error::internal(format!("failed to cache results: {error}")))
    }

    /// Read the cached result set, if any.
    pub fn cached_results(&self) -> Result<Option<CachedResults>, Error> {
        self.0
            .get::<CachedResults>(RESULTS_KEY)
            .map_err(|error| Error::internal(format!("failed to read cached results: {error}")))
    }

    /// Drop the cached result set and stored parameters ahead of a new
    /// search.
    pub fn clear_results(&self) {
        self.0.remove(RESULTS_KEY);
        self.0.remove(PARAMS_KEY);
    }

    /// Remember the submitted search parameters for form restoration.
    pub fn store_search_params<T: Serialize>(&self, params: &T) -> Result<(), Error> {
        self.0
            .insert(PARAMS_KEY, params)
            .map_err(|error| Error::internal(format!("failed to store search params: {error}")))
    }

    /// Read the stored search parameters, if any.
    pub fn search_params<T: DeserializeOwned>(&self) -> Result<Option<T>, Error> {
        self.0
            .get::<T>(PARAMS_KEY)
            .map_err(|error| Error::internal(format!("failed to read search params: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
