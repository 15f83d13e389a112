//! Favorites: the one relation this service persists beyond accounts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::Error;
use super::ports::{FavoritePersistenceError, FavoriteRepository, RecipeSource};
use super::recipe::RecipeId;
use super::search::map_source_error;
use super::user::UserId;

/// A saved recipe with display fields cached at save time.
///
/// `title` and `image` are denormalised copies fetched from the recipe API
/// when the favorite is created, so listing favorites needs no API call.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: UserId,
    pub recipe_id: RecipeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Create a new favorite for `user`, stamped now.
    pub fn new(user: UserId, recipe: RecipeId, title: String, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user,
            recipe_id: recipe,
            title,
            image,
            created_at: Utc::now(),
        }
    }
}

fn map_persistence_error(error: FavoritePersistenceError) -> Error {
    match error {
        FavoritePersistenceError::Connection { message } => Error::service_unavailable(message),
        FavoritePersistenceError::Query { message } => Error::internal(message),
        FavoritePersistenceError::Duplicate => Error::conflict("recipe is already in favorites"),
    }
}

/// Use-case service for adding, removing, and listing favorites.
#[derive(Clone)]
pub struct FavoritesService {
    favorites: Arc<dyn FavoriteRepository>,
    source: Arc<dyn RecipeSource>,
}

impl FavoritesService {
    /// Create a service over a favorite store and a recipe source.
    pub fn new(favorites: Arc<dyn FavoriteRepository>, source: Arc<dyn RecipeSource>) -> Self {
        Self { favorites, source }
    }

    /// Add a recipe to the user's favorites.
    ///
    /// Rejects with a conflict when the pair already exists; otherwise
    /// fetches title and image from the recipe API and persists them
    /// alongside the reference.
    ///
    /// # Errors
    ///
    /// Conflict for an existing favorite; recipe API failures map to their
    /// user-visible categories; persistence failures map to
    /// service-unavailable or internal errors.
    pub async fn add(&self, user: &UserId, recipe: RecipeId) -> Result<Favorite, Error> {
        let existing = self
            .favorites
            .find(user, recipe)
            .await
            .map_err(map_persistence_error)?;
        if existing.is_some() {
            return Err(Error::conflict("recipe is already in favorites"));
        }

        let details = self
            .source
            .recipe_details(recipe, false)
            .await
            .map_err(map_source_error)?;

        let favorite = Favorite::new(*user, recipe, details.title, details.image);
        self.favorites
            .insert(&favorite)
            .await
            .map_err(map_persistence_error)?;
        Ok(favorite)
    }

    /// Remove a recipe from the user's favorites.
    ///
    /// # Errors
    ///
    /// Not-found when the pair does not exist; persistence failures map as
    /// for [`FavoritesService::add`].
    pub async fn remove(&self, user: &UserId, recipe: RecipeId) -> Result<(), Error> {
        let deleted = self
            .favorites
            .delete(user, recipe)
            .await
            .map_err(map_persistence_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found("recipe is not in favorites"))
        }
    }

    /// All favorites for the user, newest first.
    pub async fn list(&self, user: &UserId) -> Result<Vec<Favorite>, Error> {
        self.favorites
            .list_for_user(user)
            .await
            .map_err(map_persistence_error)
    }

    /// Recipe ids the user has favorited, for flagging result lists.
    pub async fn favorited_ids(&self, user: &UserId) -> Result<Vec<RecipeId>, Error> {
        let favorites = self.list(user).await?;
        Ok(favorites.into_iter().map(|f| f.recipe_id).collect())
    }

    /// Whether one recipe is already favorited.
    pub async fn is_favorited(&self, user: &UserId, recipe: RecipeId) -> Result<bool, Error> {
        let existing = self
            .favorites
            .find(user, recipe)
            .await
            .map_err(map_persistence_error)?;
        Ok(existing.is_some())
    }

    /// Number of favorites for the profile page.
    pub async fn count(&self, user: &UserId) -> Result<u64, Error> {
        self.favorites
            .count_for_user(user)
            .await
            .map_err(map_persistence_error)
    }
}
