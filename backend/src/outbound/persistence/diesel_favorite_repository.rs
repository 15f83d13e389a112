//! PostgreSQL-backed `FavoriteRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{FavoritePersistenceError, FavoriteRepository};
use crate::domain::{Favorite, RecipeId, UserId};

use super::models::{FavoriteRow, NewFavoriteRow};
use super::pool::{DbPool, PoolError};
use super::schema::favorites;

/// Diesel-backed implementation of the `FavoriteRepository` port.
#[derive(Clone)]
pub struct DieselFavoriteRepository {
    pool: DbPool,
}

impl DieselFavoriteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FavoritePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            FavoritePersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> FavoritePersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            FavoritePersistenceError::Duplicate
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            FavoritePersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => FavoritePersistenceError::query("database error"),
        DieselError::NotFound => FavoritePersistenceError::query("record not found"),
        _ => FavoritePersistenceError::query("database error"),
    }
}

fn row_to_favorite(row: FavoriteRow) -> Favorite {
    Favorite {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        recipe_id: RecipeId::new(row.recipe_id),
        title: row.recipe_title,
        image: row.recipe_image,
        created_at: row.created_at,
    }
}

#[async_trait]
impl FavoriteRepository for DieselFavoriteRepository {
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Favorite>, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FavoriteRow> = favorites::table
            .filter(favorites::user_id.eq(user.as_uuid()))
            .order(favorites::created_at.desc())
            .select(FavoriteRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_favorite).collect())
    }

    async fn find(
        &self,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<Option<Favorite>, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<FavoriteRow> = favorites::table
            .filter(favorites::user_id.eq(user.as_uuid()))
            .filter(favorites::recipe_id.eq(recipe.as_i64()))
            .select(FavoriteRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_favorite))
    }

    async fn insert(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewFavoriteRow {
            id: favorite.id,
            user_id: *favorite.user_id.as_uuid(),
            recipe_id: favorite.recipe_id.as_i64(),
            recipe_title: &favorite.title,
            recipe_image: favorite.image.as_deref(),
            created_at: favorite.created_at,
        };

        diesel::insert_into(favorites::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(
        &self,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            favorites::table
                .filter(favorites::user_id.eq(user.as_uuid()))
                .filter(favorites::recipe_id.eq(recipe.as_i64())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn count_for_user(&self, user: &UserId) -> Result<u64, FavoritePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = favorites::table
            .filter(favorites::user_id.eq(user.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count.unsigned_abs())
    }
}
