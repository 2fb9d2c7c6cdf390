use anyhow::Context;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::db::BookmarkStorage;
use crate::draft::RecipeDraft;
use crate::error::AppError;
use crate::gateway::{Gateway, Target};
use crate::types::{
    BookmarkSet, Envelope, Recipe, RecipeData, RecipeSummary, SearchData, SearchState,
};

/// Application state: the active recipe, the current search and the
/// bookmarks. Constructed once with its collaborators and handed to whoever
/// drives it; there is no global instance.
pub struct RecipeStore<G, S> {
    gateway: G,
    storage: S,
    recipe: Option<Recipe>,
    search: SearchState,
    bookmarks: BookmarkSet,
}

impl<G: Gateway, S: BookmarkStorage> RecipeStore<G, S> {
    /// Build the store and hydrate bookmarks from `storage`. A missing entry
    /// means no bookmarks; an unreadable one is logged and ignored.
    pub fn new(gateway: G, storage: S, results_per_page: usize) -> Result<Self, AppError> {
        let stored = storage.read()?;
        let bookmarks = match stored {
            Some(raw) => match serde_json::from_str::<BookmarkSet>(&raw) {
                Ok(set) => {
                    tracing::info!("hydrated {} bookmarks", set.len());
                    set
                }
                Err(e) => {
                    tracing::warn!("discarding unreadable bookmark entry: {e}");
                    BookmarkSet::new()
                }
            },
            None => BookmarkSet::new(),
        };
        Ok(Self {
            gateway,
            storage,
            recipe: None,
            search: SearchState::new(results_per_page),
            bookmarks,
        })
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        self.recipe.as_ref()
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn bookmarks(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Fetch recipe `id` and make it the active recipe. On failure the
    /// previous recipe stays in place.
    pub async fn load_recipe(
        &mut self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<&Recipe, AppError> {
        let body = self
            .gateway
            .call(&Target::Recipe(id.to_string()), None, cancel)
            .await?;
        let mut recipe = recipe_from_body(body)?;
        recipe.bookmarked = self.bookmarks.contains(&recipe.id);
        tracing::debug!(id = %recipe.id, bookmarked = recipe.bookmarked, "recipe loaded");
        Ok(&*self.recipe.insert(recipe))
    }

    /// Run a search for `query`. The query is recorded before the call; the
    /// results and page pointer only change once the call succeeds.
    pub async fn load_search_results(
        &mut self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<usize, AppError> {
        self.search.query = query.to_string();
        let body = self
            .gateway
            .call(&Target::Search(query.to_string()), None, cancel)
            .await?;
        let envelope: Envelope<SearchData> = serde_json::from_value(body)?;
        self.search.results = envelope
            .data
            .recipes
            .into_iter()
            .map(RecipeSummary::from)
            .collect();
        self.search.current_page = 1;
        tracing::info!(query, results = self.search.results.len(), "search finished");
        Ok(self.search.results.len())
    }

    /// Move the page pointer to `page` (or keep the current page) and return
    /// that page of results. Out-of-range pages yield an empty slice; the
    /// stored pointer is kept within `1..=last_page`.
    pub fn page(&mut self, page: Option<usize>) -> &[RecipeSummary] {
        let page = page.unwrap_or(self.search.current_page);
        self.search.current_page = page.clamp(1, self.search.last_page());
        self.search.page_slice(page)
    }

    /// Rescale every ingredient from the current servings to `servings`.
    pub fn update_servings(&mut self, servings: u32) -> Result<&Recipe, AppError> {
        if servings == 0 {
            return Err(AppError::InvalidServings(servings));
        }
        let recipe = self.recipe.as_mut().ok_or(AppError::NoActiveRecipe)?;
        let old = f64::from(recipe.servings);
        let new = f64::from(servings);
        for ingredient in &mut recipe.ingredients {
            if let Some(q) = ingredient.quantity.as_mut() {
                *q = *q * new / old;
            }
        }
        recipe.servings = servings;
        Ok(&*recipe)
    }

    /// Bookmark `recipe`, flag it if it is the active one, and persist.
    pub fn add_bookmark(&mut self, mut recipe: Recipe) -> Result<(), AppError> {
        recipe.bookmarked = true;
        if let Some(active) = self.recipe.as_mut().filter(|r| r.id == recipe.id) {
            active.bookmarked = true;
        }
        if !self.bookmarks.insert(recipe) {
            tracing::debug!("recipe already bookmarked");
        }
        self.persist_bookmarks()
    }

    /// Remove bookmark `id`. Removing an id that is not bookmarked does
    /// nothing.
    pub fn delete_bookmark(&mut self, id: &str) -> Result<(), AppError> {
        if let Some(active) = self.recipe.as_mut().filter(|r| r.id == id) {
            active.bookmarked = false;
        }
        if self.bookmarks.remove(id).is_none() {
            tracing::debug!(id, "delete of unknown bookmark ignored");
            return Ok(());
        }
        self.persist_bookmarks()
    }

    pub fn clear_bookmarks(&mut self) -> Result<(), AppError> {
        self.bookmarks.clear();
        if let Some(active) = self.recipe.as_mut() {
            active.bookmarked = false;
        }
        self.persist_bookmarks()
    }

    /// Validate `draft`, submit it, make the stored result the active recipe
    /// and bookmark it.
    pub async fn upload_recipe(
        &mut self,
        draft: &RecipeDraft,
        cancel: &CancellationToken,
    ) -> Result<&Recipe, AppError> {
        let payload = serde_json::to_value(draft.to_payload()?)?;
        let body = self
            .gateway
            .call(&Target::Upload, Some(&payload), cancel)
            .await?;
        let recipe = recipe_from_body(body)?;
        tracing::info!(id = %recipe.id, "recipe uploaded");
        self.recipe = Some(recipe.clone());
        self.add_bookmark(recipe)?;
        self.recipe.as_ref().ok_or(AppError::NoActiveRecipe)
    }

    /// Write the entire bookmark collection to storage.
    fn persist_bookmarks(&self) -> Result<(), AppError> {
        let serialized =
            serde_json::to_string(&self.bookmarks).context("serializing bookmarks")?;
        self.storage.write(&serialized)?;
        Ok(())
    }
}

fn recipe_from_body(body: Value) -> Result<Recipe, AppError> {
    let envelope: Envelope<RecipeData> = serde_json::from_value(body)?;
    Recipe::try_from(envelope.data.recipe)
}
