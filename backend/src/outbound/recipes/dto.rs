//! DTOs for decoding recipe API JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into
//! domain records in one pass. Upstream payloads are sparse: most fields are
//! optional and default rather than failing the whole decode.

use serde::Deserialize;

use crate::domain::{RecipeDetails, RecipeId, RecipeIngredient, RecipeStub};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct IngredientRefDto {
    #[serde(default)]
    pub(super) name: String,
}

/// One hit from `findByIngredients` or a `complexSearch` result entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SearchHitDto {
    pub(super) id: i64,
    pub(super) title: String,
    #[serde(default)]
    pub(super) image: Option<String>,
    #[serde(default)]
    pub(super) ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub(super) cuisines: Vec<String>,
    #[serde(default)]
    pub(super) used_ingredient_count: Option<u32>,
    #[serde(default)]
    pub(super) missed_ingredient_count: Option<u32>,
    #[serde(default)]
    pub(super) used_ingredients: Vec<IngredientRefDto>,
    #[serde(default)]
    pub(super) missed_ingredients: Vec<IngredientRefDto>,
}

impl SearchHitDto {
    pub(super) fn into_stub(self) -> RecipeStub {
        RecipeStub {
            id: RecipeId::new(self.id),
            title: self.title,
            image: self.image,
            ready_in_minutes: self.ready_in_minutes,
            cuisines: self.cuisines,
            used_ingredient_count: self.used_ingredient_count,
            missed_ingredient_count: self.missed_ingredient_count,
            used_ingredients: ingredient_names(self.used_ingredients),
            missed_ingredients: ingredient_names(self.missed_ingredients),
        }
    }
}

fn ingredient_names(refs: Vec<IngredientRefDto>) -> Vec<String> {
    refs.into_iter()
        .map(|r| r.name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Envelope for `complexSearch` responses.
#[derive(Debug, Deserialize)]
pub(super) struct ComplexSearchResponseDto {
    #[serde(default)]
    pub(super) results: Vec<SearchHitDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExtendedIngredientDto {
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) original: Option<String>,
}

/// Full record from the `information` endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecipeInformationDto {
    pub(super) id: i64,
    pub(super) title: String,
    #[serde(default)]
    pub(super) image: Option<String>,
    #[serde(default)]
    pub(super) ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub(super) servings: Option<u32>,
    #[serde(default)]
    pub(super) cuisines: Vec<String>,
    #[serde(default)]
    pub(super) dish_types: Vec<String>,
    #[serde(default)]
    pub(super) extended_ingredients: Vec<ExtendedIngredientDto>,
    #[serde(default)]
    pub(super) instructions: Option<String>,
    #[serde(default)]
    pub(super) summary: Option<String>,
    #[serde(default)]
    pub(super) source_url: Option<String>,
    #[serde(default)]
    pub(super) nutrition: Option<serde_json::Value>,
}

impl RecipeInformationDto {
    pub(super) fn into_details(self) -> RecipeDetails {
        RecipeDetails {
            id: RecipeId::new(self.id),
            title: self.title,
            image: self.image,
            ready_in_minutes: self.ready_in_minutes,
            servings: self.servings,
            cuisines: self.cuisines,
            dish_types: self.dish_types,
            ingredients: self
                .extended_ingredients
                .into_iter()
                .filter(|i| !i.name.is_empty())
                .map(|i| RecipeIngredient {
                    name: i.name,
                    original: i.original,
                })
                .collect(),
            instructions: self.instructions,
            summary: self.summary,
            source_url: self.source_url,
            nutrition: self.nutrition,
        }
    }
}
