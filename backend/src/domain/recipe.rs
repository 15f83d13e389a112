//! External recipe records.
//!
//! Recipes are owned by the upstream recipe API and never persisted locally.
//! [`RecipeStub`] is the partial shape returned by the search endpoints,
//! [`RecipeDetails`] the full record from the detail endpoint, and
//! [`RecipeSummary`] the reduced projection kept in the session result cache
//! and returned to clients.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier assigned to a recipe by the upstream API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    /// Wrap an upstream integer identifier.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw upstream identifier.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for RecipeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Partial recipe record as returned by the search endpoints.
///
/// The ingredient-search endpoint reports which of the queried ingredients a
/// recipe uses; the complex-search endpoint omits those fields and they stay
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeStub {
    pub id: RecipeId,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<u32>,
    pub cuisines: Vec<String>,
    pub used_ingredient_count: Option<u32>,
    pub missed_ingredient_count: Option<u32>,
    pub used_ingredients: Vec<String>,
    pub missed_ingredients: Vec<String>,
}

/// One ingredient line of a full recipe record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    /// Bare ingredient name, lowercased by the upstream API.
    pub name: String,
    /// Display line including amount and unit, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
}

/// Full recipe record from the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    pub id: RecipeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_in_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub dish_types: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Nutrition block passed through verbatim when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<serde_json::Value>,
}

/// Reduced recipe projection for result lists and the session cache.
///
/// ## Invariants
/// - Holds only the fields needed to render a result card, keeping the
///   cookie-backed session under its size budget.
/// - `match_count` is present for inclusive-mode and fallback results and
///   absent for exact-mode results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_ingredient_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_ingredient_count: Option<u32>,
    #[serde(default)]
    pub used_ingredients: Vec<String>,
    #[serde(default)]
    pub missed_ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<u32>,
}

impl RecipeSummary {
    /// Build a summary from a search stub, attaching an aggregation match
    /// count when one exists.
    pub fn from_stub(stub: RecipeStub, match_count: Option<u32>) -> Self {
        Self {
            id: stub.id,
            title: stub.title,
            image: stub.image,
            ready_in_minutes: stub.ready_in_minutes,
            cuisines: stub.cuisines,
            used_ingredient_count: stub.used_ingredient_count,
            missed_ingredient_count: stub.missed_ingredient_count,
            used_ingredients: stub.used_ingredients,
            missed_ingredients: stub.missed_ingredients,
            match_count,
        }
    }

    /// Backfill fields the search endpoints omit from a full detail record.
    ///
    /// The detail image wins when present; otherwise the stub's image stays.
    pub fn apply_details(&mut self, details: &RecipeDetails) {
        self.ready_in_minutes = details.ready_in_minutes;
        self.cuisines = details.cuisines.clone();
        if details.image.is_some() {
            self.image = details.image.clone();
        }
    }
}

/// Related recipe stub shown on the detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SimilarRecipe {
    pub id: RecipeId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_in_minutes: Option<u32>,
    /// Ingredients shared with the recipe being viewed, capped for display.
    #[serde(default)]
    pub common_ingredients: Vec<String>,
}
