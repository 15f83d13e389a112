//! Domain primitives, services, and ports.
//!
//! Purpose: define the strongly typed core of the service — accounts,
//! favorites, recipe records, and the ingredient aggregation — independent
//! of HTTP and persistence concerns. Adapters on either side depend on this
//! module, never the other way round.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod favorites;
pub mod ingredients;
pub mod ports;
pub mod recipe;
pub mod search;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod user;

pub use self::accounts::AccountService;
pub use self::auth::{CredentialValidationError, LoginCredentials, SignupCredentials, PASSWORD_MIN};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::favorites::{Favorite, FavoritesService};
pub use self::ingredients::{IngredientList, EXCLUDE_MARKER};
pub use self::recipe::{
    RecipeDetails, RecipeId, RecipeIngredient, RecipeStub, RecipeSummary, SimilarRecipe,
};
pub use self::search::{
    map_source_error, RecipeSearchService, SearchFilters, SearchMode, SearchOutcome,
    SearchRequest, DEFAULT_RESULT_CAP,
};
pub use self::user::{
    Authenticatable, EmailAddress, PasswordHash, User, UserId, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
