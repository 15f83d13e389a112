//! Outbound adapter for the upstream recipe API.

mod dto;
mod http_source;

pub use http_source::RecipeHttpSource;
