//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the recipe API, the database, the password hasher). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use super::favorites::Favorite;
use super::recipe::{RecipeDetails, RecipeId, RecipeStub};
use super::user::{EmailAddress, PasswordHash, User, UserId};

/// Errors surfaced while calling the upstream recipe API.
///
/// The variants mirror the user-visible failure categories: credential
/// rejection, quota exhaustion, rate limiting, and generic upstream failures
/// are kept distinct so inbound adapters can phrase each one differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeSourceError {
    /// The API credential is missing from configuration. Never the result of
    /// a network call; surfaced before one happens.
    #[error("recipe API credential is not configured")]
    MissingCredential,

    /// The upstream rejected the configured credential (401/403).
    #[error("recipe API credential rejected: {message}")]
    InvalidCredential { message: String },

    /// The upstream reports the daily quota as exhausted (402).
    #[error("recipe API quota exhausted: {message}")]
    QuotaExceeded { message: String },

    /// The upstream rate-limited the request (429).
    #[error("recipe API rate limited request: {message}")]
    RateLimited { message: String },

    /// Any other non-success HTTP status.
    #[error("recipe API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The call exceeded its timeout.
    #[error("recipe API timeout: {message}")]
    Timeout { message: String },

    /// Network transport failed before receiving a response.
    #[error("recipe API transport failed: {message}")]
    Transport { message: String },

    /// The response body could not be decoded.
    #[error("recipe API response decode failed: {message}")]
    Decode { message: String },
}

impl RecipeSourceError {
    /// Create an invalid-credential error with the given message.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            message: message.into(),
        }
    }

    /// Create a quota-exceeded error with the given message.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
        }
    }

    /// Create a rate-limited error with the given message.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Create a generic status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a timeout error with the given message.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error with the given message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Parameters for the complex-search endpoint.
///
/// Exact-mode searches set `include_ingredients`; the title fallback on the
/// detail page sets `query` instead. Filters ride along at the query level
/// only in exact mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComplexSearchQuery {
    /// Comma-separated list all of which must appear in a match.
    pub include_ingredients: Option<String>,
    /// Free-text title query.
    pub query: Option<String>,
    pub max_ready_minutes: Option<u32>,
    pub cuisine: Option<String>,
    pub dish_type: Option<String>,
    /// Constrain matches to recipes using between 1 and 5 ingredients.
    pub low_ingredient: bool,
    /// Maximum number of results to request.
    pub count: u32,
}

/// Port for querying the upstream recipe API.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Search recipes containing a single ingredient.
    ///
    /// Used once per ingredient by the inclusive-mode aggregation; pantry
    /// staples are ignored and results come back relevance-ranked.
    async fn search_by_ingredients(
        &self,
        ingredient: &str,
        count: u32,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError>;

    /// Search recipes matching all ingredients and query-level filters.
    async fn complex_search(
        &self,
        query: &ComplexSearchQuery,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError>;

    /// Fetch the full record for one recipe.
    async fn recipe_details(
        &self,
        id: RecipeId,
        include_nutrition: bool,
    ) -> Result<RecipeDetails, RecipeSourceError>;

    /// Fetch related recipe stubs for one recipe.
    async fn similar_recipes(
        &self,
        id: RecipeId,
        count: u32,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError>;
}

/// Errors surfaced by user persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserPersistenceError {
    /// The database could not be reached or a connection checkout failed.
    #[error("user store connection failed: {message}")]
    Connection { message: String },

    /// The query failed for reasons other than connectivity.
    #[error("user store query failed: {message}")]
    Query { message: String },

    /// The email collides with an existing account (unique-index backstop;
    /// the service pre-checks before inserting).
    #[error("email is already registered")]
    DuplicateEmail,
}

impl UserPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for storing and retrieving user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Look a user up by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Look a user up by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}

/// Errors surfaced by favorite persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoritePersistenceError {
    /// The database could not be reached or a connection checkout failed.
    #[error("favorite store connection failed: {message}")]
    Connection { message: String },

    /// The query failed for reasons other than connectivity.
    #[error("favorite store query failed: {message}")]
    Query { message: String },

    /// The (user, recipe) pair already exists (unique-index backstop).
    #[error("recipe is already favorited")]
    Duplicate,
}

impl FavoritePersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for storing and retrieving favorites.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// All favorites for one user, newest first.
    async fn list_for_user(&self, user: &UserId)
        -> Result<Vec<Favorite>, FavoritePersistenceError>;

    /// Look up one (user, recipe) favorite.
    async fn find(
        &self,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<Option<Favorite>, FavoritePersistenceError>;

    /// Insert a favorite row.
    async fn insert(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError>;

    /// Delete one (user, recipe) favorite. Returns whether a row existed.
    async fn delete(
        &self,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, FavoritePersistenceError>;

    /// Number of favorites for one user.
    async fn count_for_user(&self, user: &UserId) -> Result<u64, FavoritePersistenceError>;
}

/// Errors surfaced by the password hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hashing or verification failed inside the hashing backend.
    #[error("password hashing failed: {message}")]
    Backend { message: String },
}

impl PasswordHashError {
    /// Create a backend error with the given message.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Port wrapping the password hashing primitive.
///
/// Synchronous by design: hashing is CPU-bound and called from request
/// handlers that tolerate the bounded work.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into PHC string format.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError>;

    /// Verify a plaintext password against a stored hash.
    ///
    /// A non-matching password is `Ok(false)`; `Err` is reserved for
    /// malformed hashes and backend failures.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError>;
}
