//! Favorites API handlers.
//!
//! ```text
//! GET    /api/v1/favorites
//! POST   /api/v1/favorites/{recipe_id}
//! DELETE /api/v1/favorites/{recipe_id}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use serde::Serialize;

use crate::domain::{Error, Favorite, RecipeId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Favorites list response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub favorites: Vec<Favorite>,
    pub total: usize,
}

/// List the user's favorites, newest first.
///
/// Display fields were cached at add-time, so this never calls the upstream
/// API.
#[utoipa::path(
    get,
    path = "/api/v1/favorites",
    responses(
        (status = 200, description = "Favorites", body = FavoritesResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "listFavorites"
)]
#[get("/favorites")]
pub async fn list_favorites(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<FavoritesResponse>> {
    let user_id = session.require_user_id()?;
    let favorites = state.favorites.list(&user_id).await?;
    Ok(web::Json(FavoritesResponse {
        total: favorites.len(),
        favorites,
    }))
}

/// Add a recipe to the user's favorites.
///
/// Rejects with `409 Conflict` when the pair already exists; display fields
/// are fetched from the recipe API and cached on the row.
#[utoipa::path(
    post,
    path = "/api/v1/favorites/{recipe_id}",
    params(("recipe_id" = i64, Path, description = "Upstream recipe identifier")),
    responses(
        (status = 201, description = "Favorite created", body = Favorite),
        (status = 401, description = "Not logged in", body = Error),
        (status = 409, description = "Already favorited", body = Error),
        (status = 429, description = "Upstream quota or rate limit", body = Error),
        (status = 503, description = "Upstream or store unavailable", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "addFavorite"
)]
#[post("/favorites/{recipe_id}")]
pub async fn add_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let recipe_id = RecipeId::new(path.into_inner());
    let favorite = state.favorites.add(&user_id, recipe_id).await?;
    Ok(HttpResponse::Created().json(favorite))
}

/// Remove a recipe from the user's favorites.
#[utoipa::path(
    delete,
    path = "/api/v1/favorites/{recipe_id}",
    params(("recipe_id" = i64, Path, description = "Upstream recipe identifier")),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Not favorited", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["favorites"],
    operation_id = "removeFavorite"
)]
#[delete("/favorites/{recipe_id}")]
pub async fn remove_favorite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let recipe_id = RecipeId::new(path.into_inner());
    state.favorites.remove(&user_id, recipe_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
