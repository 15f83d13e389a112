//! Ingredient search API handlers.
//!
//! ```text
//! POST /api/v1/search         {"ingredients":"eggs, milk, #cilantro","searchMode":"inclusive"}
//! GET  /api/v1/search/results   restore the cached result set
//! POST /api/v1/search/more    {"currentCount":9}
//! ```
//!
//! A successful search overwrites the session result cache with the reduced
//! projection of each recipe; back-navigation and paging read from that cache
//! without touching the upstream API again.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, RecipeId, RecipeSummary, SearchFilters, SearchMode, SearchRequest};
use crate::inbound::http::session::{CachedResults, SessionContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Page size for incremental result paging.
const PAGE_SIZE: usize = 9;

/// Search form payload; also stored in the session for form restoration.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Raw comma-separated ingredient text, `#` exclusion markers included.
    pub ingredients: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
    #[serde(default)]
    pub search_mode: SearchMode,
    #[serde(default)]
    pub low_ingredient: bool,
}

impl From<&SearchParams> for SearchRequest {
    fn from(params: &SearchParams) -> Self {
        // Empty-string filters mean "any", same as absent ones.
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned)
        };
        Self {
            ingredients: params.ingredients.clone(),
            mode: params.search_mode,
            filters: SearchFilters {
                max_ready_minutes: params.max_time,
                cuisine: non_empty(&params.cuisine),
                dish_type: non_empty(&params.dish_type),
                low_ingredient: params.low_ingredient,
            },
        }
    }
}

/// Result set returned by a search.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total_recipes: usize,
    /// True when these recipes came from the fallback pass.
    pub fallback: bool,
    /// Recipe ids the user has already favorited, for card rendering.
    pub favorited_ids: Vec<RecipeId>,
    /// Human-readable notice for fallback or empty outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Cached result set plus the parameters that produced it.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CachedSearchResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total_recipes: usize,
    pub fallback: bool,
    pub favorited_ids: Vec<RecipeId>,
    /// Parameters from the search that filled the cache, for re-populating
    /// the form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<SearchParams>,
}

/// Paging request over the cached result set.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoreRecipesRequest {
    /// How many recipes the client has rendered so far.
    #[serde(default = "default_current_count")]
    pub current_count: usize,
}

fn default_current_count() -> usize {
    PAGE_SIZE
}

/// One page entry: the summary plus the favorited flag.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedRecipe {
    #[serde(flatten)]
    pub recipe: RecipeSummary,
    pub is_favorited: bool,
}

/// One page of cached results.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoreRecipesResponse {
    pub recipes: Vec<PagedRecipe>,
    pub has_more: bool,
    pub total_recipes: usize,
    pub current_count: usize,
}

const FALLBACK_NOTICE: &str =
    "No exact matches found; showing recipes that share at least one ingredient with your search.";
const EMPTY_NOTICE: &str = "No recipes found. Try different ingredients.";

/// Run an ingredient search and cache the result set in the session.
#[utoipa::path(
    post,
    path = "/api/v1/search",
    request_body = SearchParams,
    responses(
        (status = 200, description = "Ranked results", body = SearchResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 429, description = "Upstream quota or rate limit", body = Error),
        (status = 503, description = "Upstream unavailable", body = Error)
    ),
    tags = ["search"],
    operation_id = "searchRecipes"
)]
#[post("/search")]
pub async fn search(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SearchParams>,
) -> ApiResult<web::Json<SearchResponse>> {
    let user_id = session.require_user_id()?;
    let params = payload.into_inner();

    // A new search supersedes whatever the cache held.
    session.clear_results();

    let outcome = state.search.search(&SearchRequest::from(&params)).await?;
    if !outcome.recipes.is_empty() {
        session.store_results(&CachedResults {
            recipes: outcome.recipes.clone(),
            fallback: outcome.fallback,
        })?;
        session.store_search_params(&params)?;
    }

    let favorited_ids = state.favorites.favorited_ids(&user_id).await?;
    let message = if outcome.fallback {
        Some(FALLBACK_NOTICE.to_owned())
    } else if outcome.recipes.is_empty() {
        Some(EMPTY_NOTICE.to_owned())
    } else {
        None
    };

    Ok(web::Json(SearchResponse {
        total_recipes: outcome.recipes.len(),
        recipes: outcome.recipes,
        fallback: outcome.fallback,
        favorited_ids,
        message,
    }))
}

/// Restore the cached result set for back-navigation.
#[utoipa::path(
    get,
    path = "/api/v1/search/results",
    responses(
        (status = 200, description = "Cached results (empty when none)", body = CachedSearchResponse),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["search"],
    operation_id = "cachedResults"
)]
#[get("/search/results")]
pub async fn cached_results(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CachedSearchResponse>> {
    let user_id = session.require_user_id()?;
    let cached = session.cached_results()?.unwrap_or_default();
    let params = session.search_params::<SearchParams>()?;
    let favorited_ids = state.favorites.favorited_ids(&user_id).await?;

    Ok(web::Json(CachedSearchResponse {
        total_recipes: cached.recipes.len(),
        recipes: cached.recipes,
        fallback: cached.fallback,
        favorited_ids,
        params,
    }))
}

/// Page through the cached result set.
#[utoipa::path(
    post,
    path = "/api/v1/search/more",
    request_body = MoreRecipesRequest,
    responses(
        (status = 200, description = "Next page", body = MoreRecipesResponse),
        (status = 400, description = "No cached results", body = Error),
        (status = 401, description = "Not logged in", body = Error)
    ),
    tags = ["search"],
    operation_id = "moreRecipes"
)]
#[post("/search/more")]
pub async fn more_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<MoreRecipesRequest>,
) -> ApiResult<web::Json<MoreRecipesResponse>> {
    let user_id = session.require_user_id()?;
    let Some(cached) = session.cached_results()? else {
        return Err(Error::invalid_request(
            "no recipes in session; run a search first",
        ));
    };

    let total = cached.recipes.len();
    let current = payload.current_count.min(total);
    let favorited_ids = state.favorites.favorited_ids(&user_id).await?;

    let page: Vec<PagedRecipe> = cached
        .recipes
        .into_iter()
        .skip(current)
        .take(PAGE_SIZE)
        .map(|recipe| PagedRecipe {
            is_favorited: favorited_ids.contains(&recipe.id),
            recipe,
        })
        .collect();

    let new_count = current + page.len();
    Ok(web::Json(MoreRecipesResponse {
        recipes: page,
        has_more: new_count < total,
        total_recipes: total,
        current_count: new_count,
    }))
}
