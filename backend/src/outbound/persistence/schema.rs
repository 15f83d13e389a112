//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation; `diesel print-schema` can regenerate them from a live
//! database after a migration changes the schema.

diesel::table! {
    /// User accounts.
    ///
    /// Emails are stored lowercased and carry a unique index.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Normalised email address (max 255 characters, unique).
        #[max_length = 255]
        email -> Varchar,
        /// Argon2id hash in PHC string format.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Saved recipes with display fields cached at save time.
    ///
    /// `(user_id, recipe_id)` carries a unique index as the backstop behind
    /// the service-level duplicate pre-check.
    favorites (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// External recipe identifier from the upstream API.
        recipe_id -> Int8,
        /// Recipe title cached at save time.
        #[max_length = 500]
        recipe_title -> Varchar,
        /// Recipe image URL cached at save time, when one existed.
        #[max_length = 500]
        recipe_image -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(favorites -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(favorites, users);
