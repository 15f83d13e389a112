//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic lives here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) are implementation details, never exposed to the domain.
//! - **Strongly typed errors**: database failures map to the domain
//!   persistence error enums.

mod diesel_favorite_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_favorite_repository::DieselFavoriteRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
