//! Reqwest-backed recipe API source adapter.
//!
//! This adapter owns transport details only: query construction, per-call
//! timeouts, HTTP error mapping, and JSON decoding into domain records. The
//! credential travels as the `apiKey` query parameter on every call, per the
//! upstream API contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::dto::{ComplexSearchResponseDto, RecipeInformationDto, SearchHitDto};
use crate::domain::ports::{ComplexSearchQuery, RecipeSource, RecipeSourceError};
use crate::domain::{RecipeDetails, RecipeId, RecipeStub};

/// Timeout for search calls (find-by-ingredients and complex search).
const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for per-recipe detail and similar-recipes calls. Detail fetches
/// run once per capped result, so they get the shorter bound.
const DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Recipe source adapter performing HTTP GET requests against one base URL.
#[derive(Debug)]
pub struct RecipeHttpSource {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RecipeHttpSource {
    /// Build an adapter over the given base URL and credential.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeSourceError::MissingCredential`] when the key is
    /// blank, and a transport error when the reqwest client cannot be
    /// constructed.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Result<Self, RecipeSourceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RecipeSourceError::MissingCredential);
        }
        let client = Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|error| RecipeSourceError::transport(error.to_string()))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RecipeSourceError> {
        self.base_url
            .join(path)
            .map_err(|error| RecipeSourceError::transport(format!("invalid endpoint {path}: {error}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, RecipeSourceError> {
        let response = self
            .client
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        serde_json::from_slice(&body).map_err(|error| {
            RecipeSourceError::decode(format!("invalid recipe API JSON payload: {error}"))
        })
    }
}

/// Query parameters for a complex search, minus the credential.
fn complex_search_params(query: &ComplexSearchQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("number", query.count.to_string()),
        ("addRecipeInformation", "true".to_owned()),
    ];
    if let Some(ingredients) = &query.include_ingredients {
        params.push(("includeIngredients", ingredients.clone()));
    }
    if let Some(text) = &query.query {
        params.push(("query", text.clone()));
    }
    if let Some(max) = query.max_ready_minutes {
        params.push(("maxReadyTime", max.to_string()));
    }
    if let Some(cuisine) = &query.cuisine {
        params.push(("cuisine", cuisine.clone()));
    }
    if let Some(dish_type) = &query.dish_type {
        params.push(("type", dish_type.clone()));
    }
    if query.low_ingredient {
        params.push(("minIngredients", "1".to_owned()));
        params.push(("maxIngredients", "5".to_owned()));
    }
    params
}

#[async_trait]
impl RecipeSource for RecipeHttpSource {
    async fn search_by_ingredients(
        &self,
        ingredient: &str,
        count: u32,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError> {
        let url = self.endpoint("recipes/findByIngredients")?;
        let params = [
            ("ingredients", ingredient.to_owned()),
            ("number", count.to_string()),
            ("ranking", "1".to_owned()),
            ("ignorePantry", "true".to_owned()),
        ];
        let hits: Vec<SearchHitDto> = self.get_json(url, &params, DETAIL_TIMEOUT).await?;
        Ok(hits.into_iter().map(SearchHitDto::into_stub).collect())
    }

    async fn complex_search(
        &self,
        query: &ComplexSearchQuery,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError> {
        let url = self.endpoint("recipes/complexSearch")?;
        let params = complex_search_params(query);
        let response: ComplexSearchResponseDto =
            self.get_json(url, &params, SEARCH_TIMEOUT).await?;
        Ok(response
            .results
            .into_iter()
            .map(SearchHitDto::into_stub)
            .collect())
    }

    async fn recipe_details(
        &self,
        id: RecipeId,
        include_nutrition: bool,
    ) -> Result<RecipeDetails, RecipeSourceError> {
        let url = self.endpoint(&format!("recipes/{id}/information"))?;
        let params = [("includeNutrition", include_nutrition.to_string())];
        let info: RecipeInformationDto = self.get_json(url, &params, DETAIL_TIMEOUT).await?;
        Ok(info.into_details())
    }

    async fn similar_recipes(
        &self,
        id: RecipeId,
        count: u32,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError> {
        let url = self.endpoint(&format!("recipes/{id}/similar"))?;
        let params = [("number", count.to_string())];
        let hits: Vec<SearchHitDto> = self.get_json(url, &params, DETAIL_TIMEOUT).await?;
        Ok(hits.into_iter().map(SearchHitDto::into_stub).collect())
    }
}

fn map_transport_error(error: reqwest::Error) -> RecipeSourceError {
    if error.is_timeout() {
        RecipeSourceError::timeout(error.to_string())
    } else {
        RecipeSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RecipeSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RecipeSourceError::invalid_credential(message)
        }
        StatusCode::PAYMENT_REQUIRED => RecipeSourceError::quota_exceeded(message),
        StatusCode::TOO_MANY_REQUESTS => RecipeSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RecipeSourceError::timeout(message)
        }
        _ => RecipeSourceError::status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn full_query() -> ComplexSearchQuery {
        ComplexSearchQuery {
            include_ingredients: Some("eggs, milk".to_owned()),
            query: None,
            max_ready_minutes: Some(30),
            cuisine: Some("italian".to_owned()),
            dish_type: Some("main course".to_owned()),
            low_ingredient: true,
            count: 30,
        }
    }

    #[test]
    fn complex_params_include_filters_and_ingredient_bounds() {
        let params = complex_search_params(&full_query());

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("includeIngredients"), Some("eggs, milk"));
        assert_eq!(get("number"), Some("30"));
        assert_eq!(get("maxReadyTime"), Some("30"));
        assert_eq!(get("cuisine"), Some("italian"));
        assert_eq!(get("type"), Some("main course"));
        assert_eq!(get("minIngredients"), Some("1"));
        assert_eq!(get("maxIngredients"), Some("5"));
    }

    #[test]
    fn complex_params_omit_unset_filters() {
        let query = ComplexSearchQuery {
            query: Some("shakshuka".to_owned()),
            count: 5,
            ..ComplexSearchQuery::default()
        };
        let params = complex_search_params(&query);

        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert!(keys.contains(&"query"));
        assert!(!keys.contains(&"includeIngredients"));
        assert!(!keys.contains(&"maxReadyTime"));
        assert!(!keys.contains(&"minIngredients"));
    }

    #[rstest]
    #[case::unauthorized(StatusCode::UNAUTHORIZED)]
    #[case::forbidden(StatusCode::FORBIDDEN)]
    fn credential_rejections_map_to_invalid_credential(#[case] status: StatusCode) {
        let error = map_status_error(status, b"{\"message\":\"bad key\"}");
        assert!(matches!(
            error,
            RecipeSourceError::InvalidCredential { .. }
        ));
    }

    #[rstest]
    #[case::quota(StatusCode::PAYMENT_REQUIRED, "QuotaExceeded")]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, "RateLimited")]
    #[case::request_timeout(StatusCode::REQUEST_TIMEOUT, "Timeout")]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, "Timeout")]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, "Status")]
    fn maps_http_statuses_to_expected_source_errors(
        #[case] status: StatusCode,
        #[case] expected: &str,
    ) {
        let error = map_status_error(status, b"{\"message\":\"upstream unhappy\"}");
        let matched = match expected {
            "QuotaExceeded" => matches!(error, RecipeSourceError::QuotaExceeded { .. }),
            "RateLimited" => matches!(error, RecipeSourceError::RateLimited { .. }),
            "Timeout" => matches!(error, RecipeSourceError::Timeout { .. }),
            "Status" => matches!(error, RecipeSourceError::Status { status: 500, .. }),
            _ => panic!("unsupported test expectation: {expected}"),
        };
        assert!(matched, "{status} should map to {expected}, got {error:?}");
    }

    #[test]
    fn status_preview_truncates_long_bodies() {
        let body = "x".repeat(400);
        let error = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes());
        let RecipeSourceError::Status { message, .. } = error else {
            panic!("expected status error");
        };
        assert!(message.ends_with("..."));
        assert!(message.len() < 220);
    }

    #[test]
    fn constructor_rejects_blank_credential() {
        let base = Url::parse("https://api.example.test/").expect("valid url");
        let error = RecipeHttpSource::new(base, "  ").expect_err("blank key must fail");
        assert_eq!(error, RecipeSourceError::MissingCredential);
    }

    #[test]
    fn parses_ingredient_search_hits_into_stubs() {
        let body = r#"[
            {
                "id": 101,
                "title": "Fried rice",
                "image": "https://img.example/101.jpg",
                "usedIngredientCount": 2,
                "missedIngredientCount": 1,
                "usedIngredients": [{ "name": "egg" }, { "name": "rice" }],
                "missedIngredients": [{ "name": "scallion" }]
            }
        ]"#;

        let hits: Vec<SearchHitDto> = serde_json::from_str(body).expect("hits decode");
        let stubs: Vec<RecipeStub> = hits.into_iter().map(SearchHitDto::into_stub).collect();
        assert_eq!(stubs.len(), 1);
        assert_eq!(stubs[0].id.as_i64(), 101);
        assert_eq!(stubs[0].used_ingredients, vec!["egg", "rice"]);
        assert_eq!(stubs[0].missed_ingredients, vec!["scallion"]);
        assert_eq!(stubs[0].ready_in_minutes, None);
    }

    #[test]
    fn parses_complex_search_envelope() {
        let body = r#"{
            "results": [
                { "id": 7, "title": "Carbonara", "readyInMinutes": 25, "cuisines": ["Italian"] }
            ],
            "totalResults": 1
        }"#;

        let response: ComplexSearchResponseDto = serde_json::from_str(body).expect("decode");
        let stubs: Vec<RecipeStub> = response
            .results
            .into_iter()
            .map(SearchHitDto::into_stub)
            .collect();
        assert_eq!(stubs[0].ready_in_minutes, Some(25));
        assert_eq!(stubs[0].cuisines, vec!["Italian"]);
    }

    #[test]
    fn parses_information_into_details() {
        let body = r#"{
            "id": 7,
            "title": "Carbonara",
            "readyInMinutes": 25,
            "servings": 2,
            "cuisines": ["Italian"],
            "dishTypes": ["main course"],
            "extendedIngredients": [
                { "name": "spaghetti", "original": "200g spaghetti" },
                { "name": "", "original": "ignored" }
            ],
            "sourceUrl": "https://recipes.example/carbonara"
        }"#;

        let info: RecipeInformationDto = serde_json::from_str(body).expect("decode");
        let details = info.into_details();
        assert_eq!(details.id.as_i64(), 7);
        assert_eq!(details.ingredients.len(), 1, "nameless ingredients dropped");
        assert_eq!(details.ingredients[0].name, "spaghetti");
        assert_eq!(details.dish_types, vec!["main course"]);
        assert!(details.nutrition.is_none());
    }
}
