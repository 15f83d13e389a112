//! Recipe detail API handlers.
//!
//! ```text
//! GET /api/v1/recipes/{recipe_id}
//! ```
//!
//! The detail view fetches the full record (nutrition included), a panel of
//! similar recipes annotated with shared ingredients, and the favorited
//! flag. Similar-recipe enrichment is best-effort throughout: any failing
//! call degrades the panel instead of the page.

use std::collections::BTreeSet;

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{ComplexSearchQuery, RecipeSource};
use crate::domain::{map_source_error, Error, RecipeDetails, RecipeId, SimilarRecipe};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// How many similar recipes to request.
const SIMILAR_COUNT: u32 = 5;
/// Display cap on shared ingredients per similar recipe.
const COMMON_INGREDIENT_CAP: usize = 3;

/// The upstream hosts recipe images under a predictable URL scheme; used
/// when a similar-recipe stub arrives without an image and its detail fetch
/// failed.
fn derived_image_url(id: RecipeId) -> String {
    format!("https://spoonacular.com/recipeImages/{id}-312x231.jpg")
}

/// Detail page payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailResponse {
    pub recipe: RecipeDetails,
    pub is_favorited: bool,
    pub similar_recipes: Vec<SimilarRecipe>,
}

/// Full recipe detail with similar recipes and the favorited flag.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{recipe_id}",
    params(("recipe_id" = i64, Path, description = "Upstream recipe identifier")),
    responses(
        (status = 200, description = "Recipe detail", body = RecipeDetailResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 429, description = "Upstream quota or rate limit", body = Error),
        (status = 503, description = "Upstream unavailable", body = Error)
    ),
    tags = ["recipes"],
    operation_id = "recipeDetail"
)]
#[get("/recipes/{recipe_id}")]
pub async fn recipe_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeDetailResponse>> {
    let user_id = session.require_user_id()?;
    let recipe_id = RecipeId::new(path.into_inner());

    let recipe = state
        .source
        .recipe_details(recipe_id, true)
        .await
        .map_err(map_source_error)?;
    let similar_recipes = collect_similar(state.source.as_ref(), &recipe).await;
    let is_favorited = state.favorites.is_favorited(&user_id, recipe_id).await?;

    Ok(web::Json(RecipeDetailResponse {
        recipe,
        is_favorited,
        similar_recipes,
    }))
}

/// Lowercased ingredient names of a record, for intersection.
fn ingredient_names(recipe: &RecipeDetails) -> BTreeSet<String> {
    recipe
        .ingredients
        .iter()
        .map(|ingredient| ingredient.name.to_lowercase())
        .collect()
}

/// Fetch similar recipes and annotate each with shared ingredients.
///
/// Falls back to a title search when the similar endpoint itself fails, and
/// to partial stubs when a per-recipe detail fetch fails.
async fn collect_similar(source: &dyn RecipeSource, recipe: &RecipeDetails) -> Vec<SimilarRecipe> {
    let stubs = match source.similar_recipes(recipe.id, SIMILAR_COUNT).await {
        Ok(stubs) => stubs,
        Err(error) => {
            debug!(recipe_id = %recipe.id, %error, "similar endpoint failed; trying title search");
            return title_search_fallback(source, recipe).await;
        }
    };

    let current_names = ingredient_names(recipe);
    let mut similar = Vec::with_capacity(stubs.len());
    for stub in stubs {
        let entry = match source.recipe_details(stub.id, false).await {
            Ok(info) => {
                let shared: Vec<String> = current_names
                    .intersection(&ingredient_names(&info))
                    .take(COMMON_INGREDIENT_CAP)
                    .cloned()
                    .collect();
                SimilarRecipe {
                    id: stub.id,
                    title: stub.title,
                    image: info.image.or(stub.image),
                    ready_in_minutes: info.ready_in_minutes.or(stub.ready_in_minutes),
                    common_ingredients: shared,
                }
            }
            Err(error) => {
                debug!(similar_id = %stub.id, %error, "similar detail fetch failed; keeping stub");
                SimilarRecipe {
                    image: stub.image.or_else(|| Some(derived_image_url(stub.id))),
                    id: stub.id,
                    title: stub.title,
                    ready_in_minutes: stub.ready_in_minutes,
                    common_ingredients: Vec::new(),
                }
            }
        };
        similar.push(entry);
    }
    similar
}

/// Fallback panel: complex search on the first word of the title, excluding
/// the recipe being viewed.
async fn title_search_fallback(
    source: &dyn RecipeSource,
    recipe: &RecipeDetails,
) -> Vec<SimilarRecipe> {
    let Some(first_word) = recipe.title.split_whitespace().next() else {
        return Vec::new();
    };
    let query = ComplexSearchQuery {
        query: Some(first_word.to_owned()),
        count: SIMILAR_COUNT,
        ..ComplexSearchQuery::default()
    };
    match source.complex_search(&query).await {
        Ok(stubs) => stubs
            .into_iter()
            .filter(|stub| stub.id != recipe.id)
            .take(SIMILAR_COUNT as usize)
            .map(|stub| SimilarRecipe {
                id: stub.id,
                title: stub.title,
                image: stub.image,
                ready_in_minutes: stub.ready_in_minutes,
                common_ingredients: Vec::new(),
            })
            .collect(),
        Err(error) => {
            debug!(recipe_id = %recipe.id, %error, "title fallback search failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use serde_json::Value;

    use super::*;
    use crate::domain::ports::RecipeSourceError;
    use crate::domain::test_support::{details, stub, StubRecipeSource};
    use crate::domain::RecipeIngredient;
    use crate::inbound::http::test_utils::{
        test_app_state_with_source, test_session_middleware,
    };
    use crate::inbound::http::users::{login, signup, LoginRequest, SignupRequest};

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(state).wrap(test_session_middleware()).service(
            web::scope("/api/v1")
                .service(signup)
                .service(login)
                .service(recipe_detail),
        )
    }

    async fn login_cookie<S, B>(app: &S) -> actix_web::cookie::Cookie<'static>
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
        B: actix_web::body::MessageBody,
    {
        actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/signup")
                .set_json(SignupRequest {
                    email: "ada@example.org".into(),
                    password: "hunter22".into(),
                    confirm_password: "hunter22".into(),
                })
                .to_request(),
        )
        .await;
        let login_res = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(LoginRequest {
                    email: "ada@example.org".into(),
                    password: "hunter22".into(),
                })
                .to_request(),
        )
        .await;
        login_res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    fn carbonara_details() -> crate::domain::RecipeDetails {
        let mut record = details(7, "Spaghetti Carbonara", Some(25));
        record.ingredients = vec![
            RecipeIngredient {
                name: "Spaghetti".into(),
                original: Some("200g spaghetti".into()),
            },
            RecipeIngredient {
                name: "egg".into(),
                original: None,
            },
            RecipeIngredient {
                name: "guanciale".into(),
                original: None,
            },
        ];
        record
    }

    #[actix_web::test]
    async fn detail_requires_login() {
        let state = test_app_state_with_source(Arc::new(StubRecipeSource::default()));
        let app = actix_test::init_service(test_app(state)).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/recipes/7")
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn detail_reports_shared_ingredients_with_similar_recipes() {
        let mut cacio = details(8, "Cacio e Pepe", Some(20));
        cacio.ingredients = vec![
            RecipeIngredient {
                name: "spaghetti".into(),
                original: None,
            },
            RecipeIngredient {
                name: "pecorino".into(),
                original: None,
            },
        ];
        let source = Arc::new(
            StubRecipeSource::default()
                .with_detail_record(carbonara_details())
                .with_detail_record(cacio)
                .with_similar_results(vec![stub(8, "Cacio e Pepe")]),
        );
        let app = actix_test::init_service(test_app(test_app_state_with_source(source))).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/recipes/7")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["recipe"]["title"], "Spaghetti Carbonara");
        assert_eq!(body["isFavorited"], false);
        assert_eq!(
            body["similarRecipes"][0]["commonIngredients"],
            serde_json::json!(["spaghetti"]),
            "intersection is case-insensitive and capped"
        );
    }

    #[actix_web::test]
    async fn similar_detail_failure_keeps_stub_with_derived_image() {
        // Only the viewed recipe has a detail fixture; the similar stub's
        // fetch hits the 404 default.
        let source = StubRecipeSource::default()
            .with_detail_record(carbonara_details())
            .with_similar_results(vec![{
                let mut s = stub(8, "Cacio e Pepe");
                s.image = None;
                s
            }]);
        let app = actix_test::init_service(test_app(test_app_state_with_source(Arc::new(
            source,
        ))))
        .await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/recipes/7")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(response).await;
        let similar = &body["similarRecipes"][0];
        assert_eq!(similar["commonIngredients"], serde_json::json!([]));
        assert_eq!(
            similar["image"],
            "https://spoonacular.com/recipeImages/8-312x231.jpg"
        );
    }

    #[actix_web::test]
    async fn similar_endpoint_failure_falls_back_to_title_search() {
        let source = Arc::new(
            StubRecipeSource::default()
                .with_detail_record(carbonara_details())
                .with_similar_failure(RecipeSourceError::status(500, "similar down"))
                .with_complex_results(vec![stub(7, "Spaghetti Carbonara"), stub(9, "Spaghetti Aglio")]),
        );
        let app = actix_test::init_service(test_app(test_app_state_with_source(source.clone())))
            .await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/recipes/7")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(response).await;
        let similar = body["similarRecipes"].as_array().expect("similar array");
        assert_eq!(similar.len(), 1, "the viewed recipe is excluded");
        assert_eq!(similar[0]["id"], 9);

        source.inspect_calls(|calls| {
            assert_eq!(
                calls.complex[0].query.as_deref(),
                Some("Spaghetti"),
                "fallback searches on the first word of the title"
            );
        });
    }

    #[actix_web::test]
    async fn upstream_quota_failure_maps_to_rate_limited() {
        let source = Arc::new(
            StubRecipeSource::default()
                .with_details_failure(RecipeSourceError::quota_exceeded("status 402")),
        );
        let app = actix_test::init_service(test_app(test_app_state_with_source(source))).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/recipes/7")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
