//! Ingredient list normalisation.
//!
//! Search input arrives as free text: a comma-separated ingredient list in
//! which a token may be prefixed with `#` to exclude that ingredient from
//! the query instead of including it.

/// Marker prefix that excludes an ingredient from the query.
pub const EXCLUDE_MARKER: char = '#';

/// Normalised ingredient list split into included and excluded entries.
///
/// ## Invariants
/// - Entries are trimmed, lowercased, and non-empty.
/// - Excluded entries never reach a constructed query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IngredientList {
    included: Vec<String>,
    excluded: Vec<String>,
}

impl IngredientList {
    /// Parse a raw comma-separated ingredient string.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::IngredientList;
    ///
    /// let list = IngredientList::parse("Eggs, milk , #cilantro,,");
    /// assert_eq!(list.included(), ["eggs", "milk"]);
    /// assert_eq!(list.excluded(), ["cilantro"]);
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for token in raw.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if let Some(rest) = token.strip_prefix(EXCLUDE_MARKER) {
                let rest = rest.trim();
                if !rest.is_empty() {
                    excluded.push(rest.to_lowercase());
                }
            } else {
                included.push(token.to_lowercase());
            }
        }
        Self { included, excluded }
    }

    /// Ingredients that participate in the search.
    pub fn included(&self) -> &[String] {
        &self.included
    }

    /// Ingredients the user excluded with the marker prefix.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Whether no searchable ingredient remains after normalisation.
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }

    /// Comma-joined query string over the included ingredients only.
    pub fn query_string(&self) -> String {
        self.included.join(", ")
    }
}
