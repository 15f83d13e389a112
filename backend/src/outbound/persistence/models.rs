//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{favorites, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the favorites table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = favorites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FavoriteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: i64,
    pub recipe_title: String,
    pub recipe_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new favorite records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favorites)]
pub(crate) struct NewFavoriteRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: i64,
    pub recipe_title: &'a str,
    pub recipe_image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}
