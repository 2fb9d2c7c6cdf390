use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One line of a recipe's ingredient list. `quantity` is absent for things
/// like "salt to taste".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    pub description: String,
}

/// The active recipe. This is also the shape persisted inside the bookmark
/// entry, so field names are camelCase on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub source_url: String,
    pub image: String,
    pub servings: u32,
    pub cooking_time: u32,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub bookmarked: bool,
    /// Present only on recipes submitted with our API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// Lightweight search-result projection. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            publisher: recipe.publisher.clone(),
            image: recipe.image.clone(),
            key: recipe.key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<RecipeSummary>,
    pub current_page: usize,
    pub results_per_page: usize,
}

impl SearchState {
    pub fn new(results_per_page: usize) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            current_page: 1,
            results_per_page: results_per_page.max(1),
        }
    }

    /// `ceil(|results| / results_per_page)`; zero when there are no results.
    pub fn num_pages(&self) -> usize {
        self.results.len().div_ceil(self.results_per_page)
    }

    /// Highest page the page pointer may hold.
    pub fn last_page(&self) -> usize {
        self.num_pages().max(1)
    }

    /// The results on `page`, clipped to bounds. Pages outside
    /// `1..=num_pages()` are empty.
    pub fn page_slice(&self, page: usize) -> &[RecipeSummary] {
        if page == 0 {
            return &[];
        }
        let start = (page - 1).saturating_mul(self.results_per_page);
        if start >= self.results.len() {
            return &[];
        }
        let end = (start + self.results_per_page).min(self.results.len());
        &self.results[start..end]
    }
}

/// Bookmarked recipes keyed by id. Insertion order is display order and is
/// kept through persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkSet {
    entries: Vec<Recipe>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|r| r.id == id)
    }

    /// Appends `recipe` unless its id is already present. Returns whether it
    /// was inserted.
    pub fn insert(&mut self, recipe: Recipe) -> bool {
        if self.contains(&recipe.id) {
            return false;
        }
        self.entries.push(recipe);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Recipe> {
        let index = self.entries.iter().position(|r| r.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.entries.iter()
    }

    pub fn summaries(&self) -> Vec<RecipeSummary> {
        self.entries.iter().map(RecipeSummary::from).collect()
    }
}

// ─── Wire format ───────────────────────────────────────────────────────────────

/// `{ "status": "...", "data": { ... } }` wrapper used by every API response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct RecipeData {
    pub recipe: RecipePayload,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub recipes: Vec<SummaryPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePayload {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub source_url: String,
    pub image_url: String,
    pub servings: u32,
    pub cooking_time: u32,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub key: Option<String>,
}

/// A recipe must serve at least one person; ingredient scaling divides by
/// the current servings.
impl TryFrom<RecipePayload> for Recipe {
    type Error = AppError;

    fn try_from(p: RecipePayload) -> Result<Self, AppError> {
        if p.servings == 0 {
            return Err(AppError::Decode(format!("recipe {} has zero servings", p.id)));
        }
        Ok(Self {
            id: p.id,
            title: p.title,
            publisher: p.publisher,
            source_url: p.source_url,
            image: p.image_url,
            servings: p.servings,
            cooking_time: p.cooking_time,
            ingredients: p.ingredients,
            bookmarked: false,
            key: p.key,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryPayload {
    pub id: String,
    pub title: String,
    pub publisher: String,
    pub image_url: String,
    #[serde(default)]
    pub key: Option<String>,
}

impl From<SummaryPayload> for RecipeSummary {
    fn from(p: SummaryPayload) -> Self {
        Self {
            id: p.id,
            title: p.title,
            publisher: p.publisher,
            image: p.image_url,
            key: p.key,
        }
    }
}

/// Body POSTed when submitting a new recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipePayload {
    pub title: String,
    pub source_url: String,
    pub image_url: String,
    pub publisher: String,
    pub cooking_time: u32,
    pub servings: u32,
    pub ingredients: Vec<Ingredient>,
}
