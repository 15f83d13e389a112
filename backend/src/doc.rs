//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all HTTP endpoints from the inbound layer, the shared
//! schemas, and the session cookie security scheme. The generated document
//! backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe search backend API",
        description = "Session-authenticated ingredient search, recipe detail, and favorites."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::home,
        crate::inbound::http::users::profile,
        crate::inbound::http::search::search,
        crate::inbound::http::search::cached_results,
        crate::inbound::http::search::more_recipes,
        crate::inbound::http::favorites::list_favorites,
        crate::inbound::http::favorites::add_favorite,
        crate::inbound::http::favorites::remove_favorite,
        crate::inbound::http::recipes::recipe_detail,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Favorite,
        crate::domain::RecipeDetails,
        crate::domain::RecipeIngredient,
        crate::domain::RecipeSummary,
        crate::domain::SimilarRecipe,
        crate::domain::SearchMode,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_all_surfaces() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/v1/signup",
            "/api/v1/login",
            "/api/v1/logout",
            "/api/v1/home",
            "/api/v1/profile",
            "/api/v1/search",
            "/api/v1/search/results",
            "/api/v1/search/more",
            "/api/v1/favorites",
            "/api/v1/favorites/{recipe_id}",
            "/api/v1/recipes/{recipe_id}",
            "/health/ready",
            "/health/live",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }
}
