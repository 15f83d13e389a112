//! Scripted port stubs shared by unit and integration tests.
//!
//! Fixtures are registered up front with the builder methods; recipe source
//! calls are recorded so tests can assert on constructed queries.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::favorites::Favorite;
use super::ports::{
    ComplexSearchQuery, FavoritePersistenceError, FavoriteRepository, PasswordHashError,
    PasswordHasher, RecipeSource, RecipeSourceError, UserPersistenceError, UserRepository,
};
use super::recipe::{RecipeDetails, RecipeId, RecipeStub};
use super::user::{EmailAddress, PasswordHash, User, UserId};

/// Build a minimal search stub for fixtures.
pub fn stub(id: i64, title: &str) -> RecipeStub {
    RecipeStub {
        id: RecipeId::new(id),
        title: title.to_owned(),
        image: Some(format!("https://img.example/{id}.jpg")),
        ready_in_minutes: None,
        cuisines: Vec::new(),
        used_ingredient_count: Some(1),
        missed_ingredient_count: Some(0),
        used_ingredients: Vec::new(),
        missed_ingredients: Vec::new(),
    }
}

/// Build a minimal detail record for fixtures.
pub fn details(id: i64, title: &str, ready_in_minutes: Option<u32>) -> RecipeDetails {
    RecipeDetails {
        id: RecipeId::new(id),
        title: title.to_owned(),
        image: None,
        ready_in_minutes,
        servings: Some(2),
        cuisines: Vec::new(),
        dish_types: Vec::new(),
        ingredients: Vec::new(),
        instructions: None,
        summary: None,
        source_url: None,
        nutrition: None,
    }
}

/// Calls recorded by the stub, in order.
#[derive(Debug, Default)]
pub struct CallLog {
    pub by_ingredient: Vec<String>,
    pub complex: Vec<ComplexSearchQuery>,
    pub details: Vec<RecipeId>,
    pub similar: Vec<RecipeId>,
}

#[derive(Default)]
pub struct StubRecipeSource {
    by_ingredient: HashMap<String, Result<Vec<RecipeStub>, RecipeSourceError>>,
    complex: Option<Result<Vec<RecipeStub>, RecipeSourceError>>,
    details: HashMap<i64, RecipeDetails>,
    details_failure: Option<RecipeSourceError>,
    similar: Option<Result<Vec<RecipeStub>, RecipeSourceError>>,
    calls: Mutex<CallLog>,
}

impl StubRecipeSource {
    /// Script the result for one per-ingredient search.
    pub fn with_ingredient_results(mut self, ingredient: &str, stubs: Vec<RecipeStub>) -> Self {
        self.by_ingredient.insert(ingredient.to_owned(), Ok(stubs));
        self
    }

    /// Script a failure for one per-ingredient search.
    pub fn with_ingredient_failure(mut self, ingredient: &str, error: RecipeSourceError) -> Self {
        self.by_ingredient.insert(ingredient.to_owned(), Err(error));
        self
    }

    /// Script the complex-search result.
    pub fn with_complex_results(mut self, stubs: Vec<RecipeStub>) -> Self {
        self.complex = Some(Ok(stubs));
        self
    }

    /// Script a complex-search failure.
    pub fn with_complex_failure(mut self, error: RecipeSourceError) -> Self {
        self.complex = Some(Err(error));
        self
    }

    /// Script the detail record for one recipe id.
    pub fn with_details(mut self, id: i64, title: &str, ready_in_minutes: Option<u32>) -> Self {
        self.details.insert(id, details(id, title, ready_in_minutes));
        self
    }

    /// Script a full detail record.
    pub fn with_detail_record(mut self, record: RecipeDetails) -> Self {
        self.details.insert(record.id.as_i64(), record);
        self
    }

    /// Fail every detail fetch with the given error.
    pub fn with_details_failure(mut self, error: RecipeSourceError) -> Self {
        self.details_failure = Some(error);
        self
    }

    /// Script the similar-recipes result.
    pub fn with_similar_results(mut self, stubs: Vec<RecipeStub>) -> Self {
        self.similar = Some(Ok(stubs));
        self
    }

    /// Script a similar-recipes failure.
    pub fn with_similar_failure(mut self, error: RecipeSourceError) -> Self {
        self.similar = Some(Err(error));
        self
    }

    /// Run assertions against the recorded calls.
    pub fn inspect_calls<R>(&self, f: impl FnOnce(&CallLog) -> R) -> R {
        f(&self.calls.lock().expect("call log lock"))
    }
}

#[async_trait]
impl RecipeSource for StubRecipeSource {
    async fn search_by_ingredients(
        &self,
        ingredient: &str,
        _count: u32,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError> {
        self.calls
            .lock()
            .expect("call log lock")
            .by_ingredient
            .push(ingredient.to_owned());
        match self.by_ingredient.get(ingredient) {
            Some(result) => result.clone(),
            None => Ok(Vec::new()),
        }
    }

    async fn complex_search(
        &self,
        query: &ComplexSearchQuery,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError> {
        self.calls
            .lock()
            .expect("call log lock")
            .complex
            .push(query.clone());
        match &self.complex {
            Some(result) => result.clone(),
            None => Ok(Vec::new()),
        }
    }

    async fn recipe_details(
        &self,
        id: RecipeId,
        _include_nutrition: bool,
    ) -> Result<RecipeDetails, RecipeSourceError> {
        self.calls.lock().expect("call log lock").details.push(id);
        if let Some(error) = &self.details_failure {
            return Err(error.clone());
        }
        self.details
            .get(&id.as_i64())
            .cloned()
            .ok_or_else(|| RecipeSourceError::status(404, "no detail fixture"))
    }

    async fn similar_recipes(
        &self,
        id: RecipeId,
        _count: u32,
    ) -> Result<Vec<RecipeStub>, RecipeSourceError> {
        self.calls.lock().expect("call log lock").similar.push(id);
        match &self.similar {
            Some(result) => result.clone(),
            None => Ok(Vec::new()),
        }
    }
}

/// In-memory `UserRepository` honouring the email-uniqueness backstop.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Seed the store with existing users.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            rows: Mutex::new(users),
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.rows.lock().expect("rows lock").len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if rows.iter().any(|u| u.email() == user.email()) {
            return Err(UserPersistenceError::DuplicateEmail);
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|u| u.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }
}

/// In-memory `FavoriteRepository` honouring the pair-uniqueness backstop.
#[derive(Default)]
pub struct InMemoryFavoriteRepository {
    rows: Mutex<Vec<Favorite>>,
}

impl InMemoryFavoriteRepository {
    /// Seed the store with existing favorites.
    pub fn with_favorites(favorites: Vec<Favorite>) -> Self {
        Self {
            rows: Mutex::new(favorites),
        }
    }

    /// Number of stored favorites across all users.
    pub fn len(&self) -> usize {
        self.rows.lock().expect("rows lock").len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Favorite>, FavoritePersistenceError> {
        let mut favorites: Vec<Favorite> = self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|f| f.user_id == *user)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(favorites)
    }

    async fn find(
        &self,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<Option<Favorite>, FavoritePersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|f| f.user_id == *user && f.recipe_id == recipe)
            .cloned())
    }

    async fn insert(&self, favorite: &Favorite) -> Result<(), FavoritePersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if rows
            .iter()
            .any(|f| f.user_id == favorite.user_id && f.recipe_id == favorite.recipe_id)
        {
            return Err(FavoritePersistenceError::Duplicate);
        }
        rows.push(favorite.clone());
        Ok(())
    }

    async fn delete(
        &self,
        user: &UserId,
        recipe: RecipeId,
    ) -> Result<bool, FavoritePersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|f| !(f.user_id == *user && f.recipe_id == recipe));
        Ok(rows.len() < before)
    }

    async fn count_for_user(&self, user: &UserId) -> Result<u64, FavoritePersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|f| f.user_id == *user)
            .count() as u64)
    }
}

/// Reversible stand-in for the hashing port: hashes to `hashed:<password>`.
#[derive(Clone, Default)]
pub struct StubPasswordHasher;

impl PasswordHasher for StubPasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        PasswordHash::new(format!("hashed:{password}"))
            .map_err(|err| PasswordHashError::backend(err.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
        Ok(hash.as_str() == format!("hashed:{password}"))
    }
}
