//! Ingredient aggregation and fallback search.
//!
//! Exact mode issues one complex search requiring every ingredient; inclusive
//! mode issues one search per ingredient and merges the results, ranking by
//! how many distinct ingredient queries matched each recipe. Either way, a
//! primary search that comes back empty triggers a fallback pass: the
//! inclusive aggregation re-run without filters, flagged so clients can label
//! the results as near misses.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::error::Error;
use super::ingredients::IngredientList;
use super::ports::{ComplexSearchQuery, RecipeSource, RecipeSourceError};
use super::recipe::{RecipeDetails, RecipeId, RecipeStub, RecipeSummary};

/// Default cap on returned recipes, applied before detail enrichment.
pub const DEFAULT_RESULT_CAP: usize = 30;

/// Results requested from each per-ingredient query; higher than the result
/// cap so the union has enough candidates to rank.
const PER_INGREDIENT_FETCH: u32 = 50;

/// How a multi-ingredient query combines its ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Every ingredient must appear in a matching recipe.
    #[default]
    Exact,
    /// Any ingredient may match; results rank by distinct-ingredient count.
    Inclusive,
}

/// Optional constraints on a search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_ready_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dish_type: Option<String>,
    /// Constrain exact-mode matches to recipes using 1-5 ingredients.
    #[serde(default)]
    pub low_ingredient: bool,
}

impl SearchFilters {
    /// Post-hoc filter check against an enriched detail record.
    ///
    /// Cuisine and dish type compare case-insensitively; a recipe with no
    /// ready time passes the max-time bound (unknown is not over the limit).
    fn matches(&self, details: &RecipeDetails) -> bool {
        if let Some(max) = self.max_ready_minutes {
            if details.ready_in_minutes.unwrap_or(0) > max {
                return false;
            }
        }
        if let Some(cuisine) = &self.cuisine {
            if !details
                .cuisines
                .iter()
                .any(|c| c.eq_ignore_ascii_case(cuisine))
            {
                return false;
            }
        }
        if let Some(dish_type) = &self.dish_type {
            if !details
                .dish_types
                .iter()
                .any(|d| d.eq_ignore_ascii_case(dish_type))
            {
                return false;
            }
        }
        true
    }
}

/// A parsed search request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchRequest {
    /// Raw comma-separated ingredient text, `#` markers included.
    pub ingredients: String,
    pub mode: SearchMode,
    pub filters: SearchFilters,
}

/// Ranked result set plus the flag marking fallback results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub recipes: Vec<RecipeSummary>,
    /// True when these recipes came from the fallback pass rather than the
    /// primary search.
    pub fallback: bool,
}

/// One aggregation slot: the first-seen record and its running match count.
///
/// Keeping both in one map entry removes the parallel-map bookkeeping the
/// dedup would otherwise need.
#[derive(Debug, Clone)]
struct AggregatedRecipe {
    stub: RecipeStub,
    match_count: u32,
}

/// Map a recipe source error to its user-visible domain error.
///
/// Each upstream failure category keeps a distinct message and a structured
/// `details.kind` so clients can react programmatically.
pub fn map_source_error(error: RecipeSourceError) -> Error {
    let kind_details = |kind: &str| serde_json::json!({ "upstream": "recipe_api", "kind": kind });
    match error {
        RecipeSourceError::MissingCredential => {
            Error::internal("recipe API credential is not configured")
                .with_details(kind_details("missing_credential"))
        }
        RecipeSourceError::InvalidCredential { message } => Error::service_unavailable(format!(
            "recipe API key was rejected; check the RECIPE_API_KEY configuration ({message})"
        ))
        .with_details(kind_details("invalid_credential")),
        RecipeSourceError::QuotaExceeded { message } => Error::rate_limited(format!(
            "recipe API daily quota exceeded; try again tomorrow or upgrade the API plan ({message})"
        ))
        .with_details(kind_details("quota_exceeded")),
        RecipeSourceError::RateLimited { message } => Error::rate_limited(format!(
            "too many requests to the recipe API; wait a moment and try again ({message})"
        ))
        .with_details(kind_details("rate_limited")),
        RecipeSourceError::Status { status, message } => {
            Error::service_unavailable(format!("recipe API error: status {status} ({message})"))
                .with_details(serde_json::json!({
                    "upstream": "recipe_api",
                    "kind": "status",
                    "status": status,
                }))
        }
        RecipeSourceError::Timeout { message } => {
            Error::service_unavailable(format!("recipe API timed out: {message}"))
                .with_details(kind_details("timeout"))
        }
        RecipeSourceError::Transport { message } => {
            Error::service_unavailable(format!("recipe API unreachable: {message}"))
                .with_details(kind_details("transport"))
        }
        RecipeSourceError::Decode { message } => {
            Error::internal(format!("recipe API response was malformed: {message}"))
                .with_details(kind_details("decode"))
        }
    }
}

/// Failures that must surface to the user even from a merge pass that
/// otherwise tolerates per-call errors.
fn is_fatal(error: &RecipeSourceError) -> bool {
    matches!(
        error,
        RecipeSourceError::MissingCredential
            | RecipeSourceError::InvalidCredential { .. }
            | RecipeSourceError::QuotaExceeded { .. }
            | RecipeSourceError::RateLimited { .. }
    )
}

/// Use-case service running ingredient searches against the recipe source.
#[derive(Clone)]
pub struct RecipeSearchService {
    source: Arc<dyn RecipeSource>,
    result_cap: usize,
}

impl RecipeSearchService {
    /// Create a service with the default result cap.
    pub fn new(source: Arc<dyn RecipeSource>) -> Self {
        Self::with_result_cap(source, DEFAULT_RESULT_CAP)
    }

    /// Create a service with an explicit result cap.
    pub fn with_result_cap(source: Arc<dyn RecipeSource>, result_cap: usize) -> Self {
        Self {
            source,
            result_cap: result_cap.max(1),
        }
    }

    /// Run a search, falling back to the inclusive aggregation when the
    /// primary pass yields nothing.
    ///
    /// # Errors
    ///
    /// Invalid-request when no searchable ingredient remains after
    /// normalisation; upstream failures map to their user-visible categories.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, Error> {
        let list = IngredientList::parse(&request.ingredients);
        if list.is_empty() {
            return Err(Error::invalid_request(
                "at least one ingredient is required",
            ));
        }

        let primary = match request.mode {
            SearchMode::Exact => self.exact_search(&list, &request.filters).await?,
            SearchMode::Inclusive => self.inclusive_search(&list, &request.filters).await?,
        };
        if !primary.is_empty() {
            return Ok(SearchOutcome {
                recipes: primary,
                fallback: false,
            });
        }

        debug!(
            ingredients = %list.query_string(),
            "primary search empty; running fallback aggregation"
        );
        let fallback = self
            .inclusive_search(&list, &SearchFilters::default())
            .await?;
        let flagged = !fallback.is_empty();
        Ok(SearchOutcome {
            recipes: fallback,
            fallback: flagged,
        })
    }

    /// Exact mode: one complex search with query-level filters, then detail
    /// enrichment per result.
    async fn exact_search(
        &self,
        list: &IngredientList,
        filters: &SearchFilters,
    ) -> Result<Vec<RecipeSummary>, Error> {
        let query = ComplexSearchQuery {
            include_ingredients: Some(list.query_string()),
            query: None,
            max_ready_minutes: filters.max_ready_minutes,
            cuisine: filters.cuisine.clone(),
            dish_type: filters.dish_type.clone(),
            low_ingredient: filters.low_ingredient,
            count: self.result_cap as u32,
        };
        let stubs = self
            .source
            .complex_search(&query)
            .await
            .map_err(map_source_error)?;

        let mut recipes = Vec::with_capacity(stubs.len());
        for stub in stubs {
            let mut summary = RecipeSummary::from_stub(stub, None);
            self.enrich(&mut summary).await;
            recipes.push(summary);
        }
        Ok(recipes)
    }

    /// Inclusive mode: merge per-ingredient queries, rank by match count,
    /// cap, then enrich and apply filters post-hoc.
    ///
    /// Filters cannot ride along on the per-ingredient endpoint, so they run
    /// here after enrichment; a recipe whose enrichment failed passes through
    /// unfiltered with its partial fields.
    async fn inclusive_search(
        &self,
        list: &IngredientList,
        filters: &SearchFilters,
    ) -> Result<Vec<RecipeSummary>, Error> {
        let merged = self.aggregate_by_ingredient(list).await?;

        let mut ranked: Vec<AggregatedRecipe> = merged.into_values().collect();
        ranked.sort_by(|a, b| b.match_count.cmp(&a.match_count));
        ranked.truncate(self.result_cap);

        let mut recipes = Vec::with_capacity(ranked.len());
        for entry in ranked {
            let mut summary = RecipeSummary::from_stub(entry.stub, Some(entry.match_count));
            if let Some(details) = self.enrich(&mut summary).await {
                if !filters.matches(&details) {
                    continue;
                }
            }
            recipes.push(summary);
        }
        Ok(recipes)
    }

    /// Issue one query per ingredient and union the results by recipe id,
    /// counting how many distinct ingredient queries matched each id.
    ///
    /// Non-fatal per-ingredient failures skip that ingredient; credential and
    /// quota failures abort the pass because retrying the next ingredient
    /// cannot succeed either.
    async fn aggregate_by_ingredient(
        &self,
        list: &IngredientList,
    ) -> Result<BTreeMap<RecipeId, AggregatedRecipe>, Error> {
        let mut merged: BTreeMap<RecipeId, AggregatedRecipe> = BTreeMap::new();
        for ingredient in list.included() {
            let stubs = match self
                .source
                .search_by_ingredients(ingredient, PER_INGREDIENT_FETCH)
                .await
            {
                Ok(stubs) => stubs,
                Err(error) if is_fatal(&error) => return Err(map_source_error(error)),
                Err(error) => {
                    warn!(%ingredient, %error, "per-ingredient search failed; skipping");
                    continue;
                }
            };
            for stub in stubs {
                merged
                    .entry(stub.id)
                    .and_modify(|entry| entry.match_count += 1)
                    .or_insert(AggregatedRecipe {
                        stub,
                        match_count: 1,
                    });
            }
        }
        Ok(merged)
    }

    /// Detail enrichment: backfill ready time and cuisines from the detail
    /// endpoint. Failures keep the partial record and return `None`.
    async fn enrich(&self, summary: &mut RecipeSummary) -> Option<RecipeDetails> {
        match self.source.recipe_details(summary.id, false).await {
            Ok(details) => {
                summary.apply_details(&details);
                Some(details)
            }
            Err(error) => {
                debug!(recipe_id = %summary.id, %error, "detail enrichment failed; keeping partial record");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the aggregation contract: ranking, dedup, exclusion,
    //! fallback triggering, and per-call error recovery.

    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::test_support::{details, stub, StubRecipeSource};

    fn service(source: StubRecipeSource) -> (RecipeSearchService, Arc<StubRecipeSource>) {
        let source = Arc::new(source);
        (RecipeSearchService::new(source.clone()), source)
    }

    fn inclusive_request(ingredients: &str) -> SearchRequest {
        SearchRequest {
            ingredients: ingredients.to_owned(),
            mode: SearchMode::Inclusive,
            filters: SearchFilters::default(),
        }
    }

    fn exact_request(ingredients: &str) -> SearchRequest {
        SearchRequest {
            ingredients: ingredients.to_owned(),
            mode: SearchMode::Exact,
            filters: SearchFilters::default(),
        }
    }

    #[tokio::test]
    async fn inclusive_ranking_is_non_increasing_and_deduplicated() {
        let source = StubRecipeSource::default()
            .with_ingredient_results("egg", vec![stub(1, "Fried rice"), stub(2, "Omelette")])
            .with_ingredient_results("rice", vec![stub(1, "Fried rice"), stub(3, "Congee")]);
        let (service, _source) = service(source);

        let outcome = service
            .search(&inclusive_request("egg, rice"))
            .await
            .expect("search should succeed");

        let ids: Vec<i64> = outcome.recipes.iter().map(|r| r.id.as_i64()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped, "no duplicate ids in the output");

        let counts: Vec<u32> = outcome
            .recipes
            .iter()
            .map(|r| r.match_count.expect("inclusive results carry match counts"))
            .collect();
        assert!(
            counts.windows(2).all(|w| w[0] >= w[1]),
            "match counts must be non-increasing: {counts:?}"
        );
        assert_eq!(
            outcome.recipes[0].id.as_i64(),
            1,
            "recipe matching both ingredients ranks first"
        );
    }

    #[tokio::test]
    async fn excluded_ingredients_never_reach_the_source() {
        let (service, source) =
            service(StubRecipeSource::default().with_complex_results(vec![stub(1, "Frittata")]));

        let outcome = service
            .search(&exact_request("eggs, milk, #cilantro"))
            .await
            .expect("search should succeed");
        assert!(!outcome.fallback);

        source.inspect_calls(|calls| {
            assert_eq!(calls.complex.len(), 1);
            let query = calls.complex[0]
                .include_ingredients
                .as_deref()
                .expect("exact mode sets includeIngredients");
            assert_eq!(query, "eggs, milk");
            assert!(!query.contains("cilantro"));
        });
    }

    #[tokio::test]
    async fn fallback_runs_only_when_primary_is_empty() {
        let source = StubRecipeSource::default()
            .with_complex_results(Vec::new())
            .with_ingredient_results("unobtainium", vec![stub(9, "Close enough")]);
        let (service, _source) = service(source);

        let outcome = service
            .search(&exact_request("unobtainium"))
            .await
            .expect("search should succeed");

        assert!(outcome.fallback, "fallback results must be flagged");
        assert_eq!(outcome.recipes.len(), 1);
        assert_eq!(
            outcome.recipes[0].match_count,
            Some(1),
            "fallback results carry match counts"
        );
    }

    #[tokio::test]
    async fn fallback_does_not_run_when_primary_has_results() {
        let (service, source) =
            service(StubRecipeSource::default().with_complex_results(vec![stub(1, "Frittata")]));

        let outcome = service
            .search(&exact_request("eggs"))
            .await
            .expect("search should succeed");
        assert!(!outcome.fallback);

        source.inspect_calls(|calls| {
            assert!(
                calls.by_ingredient.is_empty(),
                "no per-ingredient fallback queries after a non-empty primary"
            );
        });
    }

    #[tokio::test]
    async fn enrichment_failure_keeps_partial_record() {
        let source = StubRecipeSource::default()
            .with_complex_results(vec![stub(1, "Frittata")])
            .with_details_failure(RecipeSourceError::timeout("detail fetch timed out"));
        let (service, _source) = service(source);

        let outcome = service
            .search(&exact_request("eggs"))
            .await
            .expect("search should succeed despite enrichment failures");

        assert_eq!(outcome.recipes.len(), 1);
        assert_eq!(outcome.recipes[0].title, "Frittata");
        assert_eq!(outcome.recipes[0].ready_in_minutes, None);
    }

    #[tokio::test]
    async fn inclusive_mode_applies_filters_after_enrichment() {
        let source = StubRecipeSource::default()
            .with_ingredient_results("egg", vec![stub(1, "Slow eggs"), stub(2, "Fast eggs")])
            .with_detail_record(details(1, "Slow eggs", Some(90)))
            .with_detail_record(details(2, "Fast eggs", Some(10)));
        let (service, _source) = service(source);

        let request = SearchRequest {
            ingredients: "egg".into(),
            mode: SearchMode::Inclusive,
            filters: SearchFilters {
                max_ready_minutes: Some(30),
                ..SearchFilters::default()
            },
        };
        let outcome = service.search(&request).await.expect("search succeeds");

        let ids: Vec<i64> = outcome.recipes.iter().map(|r| r.id.as_i64()).collect();
        assert_eq!(ids, vec![2], "over-limit recipe filtered post-hoc");
    }

    #[tokio::test]
    async fn exact_mode_pushes_filters_into_the_query() {
        let (service, source) =
            service(StubRecipeSource::default().with_complex_results(vec![stub(1, "Carbonara")]));

        let request = SearchRequest {
            ingredients: "eggs, pasta".into(),
            mode: SearchMode::Exact,
            filters: SearchFilters {
                max_ready_minutes: Some(30),
                cuisine: Some("italian".into()),
                dish_type: Some("main course".into()),
                low_ingredient: true,
            },
        };
        service.search(&request).await.expect("search succeeds");

        source.inspect_calls(|calls| {
            let query = &calls.complex[0];
            assert_eq!(query.max_ready_minutes, Some(30));
            assert_eq!(query.cuisine.as_deref(), Some("italian"));
            assert_eq!(query.dish_type.as_deref(), Some("main course"));
            assert!(query.low_ingredient);
        });
    }

    #[tokio::test]
    async fn per_ingredient_transport_failures_are_skipped() {
        let source = StubRecipeSource::default()
            .with_ingredient_failure("egg", RecipeSourceError::transport("connection refused"))
            .with_ingredient_results("rice", vec![stub(3, "Congee")]);
        let (service, _source) = service(source);

        let outcome = service
            .search(&inclusive_request("egg, rice"))
            .await
            .expect("search should survive one failing ingredient");

        assert_eq!(outcome.recipes.len(), 1);
        assert_eq!(outcome.recipes[0].id.as_i64(), 3);
    }

    #[rstest]
    #[case(RecipeSourceError::quota_exceeded("status 402"), ErrorCode::RateLimited)]
    #[case(RecipeSourceError::invalid_credential("status 401"), ErrorCode::ServiceUnavailable)]
    #[tokio::test]
    async fn fatal_upstream_failures_surface_from_aggregation(
        #[case] error: RecipeSourceError,
        #[case] expected: ErrorCode,
    ) {
        let (service, _source) =
            service(StubRecipeSource::default().with_ingredient_failure("egg", error));

        let err = service
            .search(&inclusive_request("egg"))
            .await
            .expect_err("fatal upstream failure must surface");

        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn result_cap_bounds_enrichment_calls() {
        let stubs: Vec<_> = (1..=10).map(|id| stub(id, "Egg dish")).collect();
        let source = Arc::new(StubRecipeSource::default().with_ingredient_results("egg", stubs));
        let service = RecipeSearchService::with_result_cap(source.clone(), 3);

        let outcome = service
            .search(&inclusive_request("egg"))
            .await
            .expect("search succeeds");

        assert_eq!(outcome.recipes.len(), 3);
        source.inspect_calls(|calls| {
            assert_eq!(calls.details.len(), 3, "enrichment happens after the cap");
        });
    }

    #[tokio::test]
    async fn empty_ingredient_list_is_rejected() {
        let (service, _source) = service(StubRecipeSource::default());
        let err = service
            .search(&inclusive_request("#beef, , "))
            .await
            .expect_err("no searchable ingredient must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
