use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::db::BookmarkStorage;
use crate::draft::RecipeDraft;
use crate::gateway::Gateway;
use crate::navigation::Location;
use crate::render::Renderer;
use crate::store::RecipeStore;
use crate::types::RecipeSummary;
use crate::views::{PaginationView, PreviewList, PreviewView, RecipeView, UploadView};

// ─── Controller ────────────────────────────────────────────────────────────────

/// Everything one session of the UI needs: the store, one renderer per view,
/// and the location fragment. Actions below are what the UI triggers.
pub struct App<G, S> {
    pub store: RecipeStore<G, S>,
    pub recipe_view: Renderer<RecipeView>,
    pub results_view: Renderer<PreviewView>,
    pub pagination_view: Renderer<PaginationView>,
    pub bookmarks_view: Renderer<PreviewView>,
    pub upload_view: Renderer<UploadView>,
    pub location: Location,
    /// How long the upload window stays open after a successful submission.
    pub modal_close: Duration,
    upload_close_at: Option<Instant>,
}

impl<G: Gateway, S: BookmarkStorage> App<G, S> {
    pub fn new(store: RecipeStore<G, S>) -> Self {
        let mut app = Self {
            store,
            recipe_view: Renderer::new(RecipeView, "div"),
            results_view: Renderer::new(PreviewView::results(), "ul"),
            pagination_view: Renderer::new(PaginationView, "div"),
            bookmarks_view: Renderer::new(PreviewView::bookmarks(), "ul"),
            upload_view: Renderer::new(UploadView::default(), "div"),
            location: Location::new(),
            modal_close: crate::config::MODAL_CLOSE,
            upload_close_at: None,
        };
        app.recipe_view.render_message(None);
        app
    }

    fn current_results(&mut self) -> PreviewList {
        let active = self.location.recipe_id().map(str::to_string);
        let page = self.store.page(None).to_vec();
        PreviewList {
            items: page,
            active_id: active,
        }
    }

    fn current_bookmarks(&self) -> PreviewList {
        PreviewList::new(self.store.bookmarks().summaries(), self.location.recipe_id())
    }

    /// Load the recipe named by the location fragment and show it. Results
    /// and bookmarks are patched first so the active highlight moves.
    pub async fn control_recipe(&mut self, cancel: &CancellationToken) -> Result<(), String> {
        let Some(id) = self.location.recipe_id().map(str::to_string) else {
            return Ok(());
        };

        self.recipe_view.render_spinner();

        // An empty list has nothing to patch; leave whatever state is shown.
        let results = self.current_results();
        if !results.items.is_empty() {
            self.results_view.update(&results);
        }
        let bookmarks = self.current_bookmarks();
        if !bookmarks.items.is_empty() {
            self.bookmarks_view.update(&bookmarks);
        }

        match self.store.load_recipe(&id, cancel).await {
            Ok(recipe) => {
                self.recipe_view.render(Some(recipe));
                Ok(())
            }
            Err(e) => {
                tracing::error!("loading recipe {id} failed: {e}");
                self.recipe_view.render_error(None);
                Err(e.to_string())
            }
        }
    }

    /// Run a search and show its first page with pagination controls.
    pub async fn control_search_results(
        &mut self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<(), String> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.results_view.render_spinner();

        if let Err(e) = self.store.load_search_results(query, cancel).await {
            tracing::error!("search for {query:?} failed: {e}");
            self.results_view.render_error(Some(&e.to_string()));
            return Err(e.to_string());
        }

        let results = self.current_results();
        self.results_view.render(Some(&results));
        self.pagination_view.render(Some(self.store.search()));
        Ok(())
    }

    pub fn control_pagination(&mut self, go_to_page: usize) {
        let active = self.location.recipe_id().map(str::to_string);
        let items: Vec<RecipeSummary> = self.store.page(Some(go_to_page)).to_vec();
        self.results_view.render(Some(&PreviewList {
            items,
            active_id: active,
        }));
        self.pagination_view.render(Some(self.store.search()));
    }

    /// Rescale the open recipe. Non-positive counts are ignored, as the
    /// view never offers them.
    pub fn control_servings(&mut self, new_servings: u32) -> Result<(), String> {
        if new_servings == 0 {
            return Ok(());
        }
        let recipe = self
            .store
            .update_servings(new_servings)
            .map_err(|e| e.to_string())?;
        self.recipe_view.update(recipe);
        Ok(())
    }

    /// Bookmark the open recipe, or remove its bookmark.
    pub fn control_toggle_bookmark(&mut self) -> Result<(), String> {
        let recipe = self.store.recipe().cloned().ok_or("no_recipe_loaded")?;
        let result = if recipe.bookmarked {
            self.store.delete_bookmark(&recipe.id)
        } else {
            self.store.add_bookmark(recipe)
        };
        if let Some(recipe) = self.store.recipe() {
            self.recipe_view.update(recipe);
        }
        let bookmarks = self.current_bookmarks();
        self.bookmarks_view.render(Some(&bookmarks));
        result.map_err(|e| e.to_string())
    }

    pub fn control_bookmarks(&mut self) {
        let bookmarks = self.current_bookmarks();
        self.bookmarks_view.render(Some(&bookmarks));
    }

    pub fn control_clear_bookmarks(&mut self) -> Result<(), String> {
        self.store.clear_bookmarks().map_err(|e| e.to_string())?;
        if let Some(recipe) = self.store.recipe() {
            self.recipe_view.update(recipe);
        }
        self.control_bookmarks();
        Ok(())
    }

    /// Submit a new recipe from form fields. On success the recipe is shown,
    /// bookmarked, and its id pushed into the location without re-running
    /// [`Self::control_recipe`]. The upload window is scheduled to close
    /// `modal_close` later; see [`Self::close_upload_window_if_due`].
    pub async fn control_add_recipe(
        &mut self,
        draft: RecipeDraft,
        cancel: &CancellationToken,
    ) -> Result<(), String> {
        self.upload_close_at = None;
        self.upload_view.view_mut().open_window();
        self.upload_view.render_spinner();

        let id = match self.store.upload_recipe(&draft, cancel).await {
            Ok(recipe) => {
                self.recipe_view.render(Some(recipe));
                recipe.id.clone()
            }
            Err(e) => {
                tracing::error!("upload failed: {e}");
                self.upload_view.render_error(Some(&e.to_string()));
                return Err(e.to_string());
            }
        };

        self.upload_view.render_message(None);
        self.control_bookmarks();
        self.location.push_state(&id);
        self.upload_close_at = Some(Instant::now() + self.modal_close);
        Ok(())
    }

    /// Hide the upload window once its close deadline has passed. Returns
    /// true if the window was closed by this call.
    pub fn close_upload_window_if_due(&mut self) -> bool {
        let Some(deadline) = self.upload_close_at else {
            return false;
        };
        if Instant::now() < deadline {
            return false;
        }
        self.upload_close_at = None;
        if !self.upload_view.view().is_open() {
            return false;
        }
        self.upload_view.view_mut().hide_window();
        true
    }

    /// Open the open recipe's source page in the system browser.
    pub fn open_source(&self) -> Result<(), String> {
        let recipe = self.store.recipe().ok_or("no_recipe_loaded")?;
        if !(recipe.source_url.starts_with("http://") || recipe.source_url.starts_with("https://")) {
            return Err("invalid_source_url".to_string());
        }
        open::that_detached(&recipe.source_url).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBookmarkStorage;
    use crate::error::AppError;
    use crate::gateway::Target;
    use crate::render::ViewPhase;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Serves one recipe and a 12-result search. Uploads are refused with a
    /// 403 unless `accept_uploads` is set.
    #[derive(Default)]
    struct StaticGateway {
        accept_uploads: bool,
    }

    #[async_trait]
    impl Gateway for StaticGateway {
        async fn call(
            &self,
            target: &Target,
            payload: Option<&Value>,
            _cancel: &CancellationToken,
        ) -> Result<Value, AppError> {
            match target {
                Target::Recipe(id) if id == "r1" => Ok(json!({ "data": { "recipe": {
                    "id": "r1", "title": "Soup", "publisher": "P",
                    "source_url": "http://example.com", "image_url": "",
                    "servings": 2, "cooking_time": 10,
                    "ingredients": [{ "quantity": 1.0, "unit": "l", "description": "water" }]
                }}})),
                Target::Recipe(_) => Err(AppError::NotFound { message: "Invalid _id".into() }),
                Target::Search(_) => Ok(json!({ "data": { "recipes": (0..12).map(|i| json!({
                    "id": format!("s{i}"), "title": "Soup", "publisher": "P", "image_url": ""
                })).collect::<Vec<_>>() }})),
                Target::Upload if self.accept_uploads => {
                    let mut recipe = payload.cloned().unwrap_or_default();
                    recipe["id"] = json!("new-1");
                    recipe["key"] = json!("k");
                    Ok(json!({ "data": { "recipe": recipe } }))
                }
                Target::Upload => Err(AppError::Network { message: "Forbidden".into(), status: 403 }),
            }
        }
    }

    fn app_with(gateway: StaticGateway) -> App<StaticGateway, MemoryBookmarkStorage> {
        App::new(RecipeStore::new(gateway, MemoryBookmarkStorage::new(), 10).unwrap())
    }

    fn app() -> App<StaticGateway, MemoryBookmarkStorage> {
        app_with(StaticGateway::default())
    }

    #[tokio::test]
    async fn test_recipe_flow_renders_and_scales() {
        let mut app = app();
        let cancel = CancellationToken::new();
        app.location.navigate("#r1");
        app.control_recipe(&cancel).await.unwrap();
        assert_eq!(app.recipe_view.phase(), ViewPhase::Rendered);

        app.control_servings(4).unwrap();
        let quantity = app.recipe_view.target().find_by_class("recipe__quantity").unwrap();
        assert_eq!(quantity.text_content(), "2");

        app.control_toggle_bookmark().unwrap();
        assert_eq!(app.bookmarks_view.target().find_all_by_class("preview").len(), 1);
        app.control_toggle_bookmark().unwrap();
        assert_eq!(app.bookmarks_view.phase(), ViewPhase::ErrorShown);
    }

    #[tokio::test]
    async fn test_missing_recipe_shows_error_state() {
        let mut app = app();
        let cancel = CancellationToken::new();
        app.location.navigate("nope");
        assert!(app.control_recipe(&cancel).await.is_err());
        assert_eq!(app.recipe_view.phase(), ViewPhase::ErrorShown);
    }

    #[tokio::test]
    async fn test_search_then_paginate() {
        let mut app = app();
        let cancel = CancellationToken::new();
        app.control_search_results("soup", &cancel).await.unwrap();
        assert_eq!(app.results_view.target().find_all_by_class("preview").len(), 10);

        app.control_pagination(2);
        assert_eq!(app.results_view.target().find_all_by_class("preview").len(), 2);
        assert_eq!(app.store.search().current_page, 2);
        let prev = app.pagination_view.target().find_by_class("pagination__btn--prev").unwrap();
        assert_eq!(prev.attr("data-goto"), Some("1"));
    }

    #[tokio::test]
    async fn test_failed_upload_shows_server_message() {
        let mut app = app();
        let cancel = CancellationToken::new();
        let draft = RecipeDraft::from_fields([("servings", "2"), ("cookingTime", "5")]);
        let err = app.control_add_recipe(draft, &cancel).await.unwrap_err();
        assert_eq!(err, "Forbidden (403)");
        assert_eq!(app.upload_view.phase(), ViewPhase::ErrorShown);
        assert!(app.location.recipe_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_window_closes_after_deadline_without_blocking() {
        let mut app = app_with(StaticGateway { accept_uploads: true });
        let cancel = CancellationToken::new();
        let draft = RecipeDraft::from_fields([
            ("title", "Toast"),
            ("servings", "2"),
            ("cookingTime", "5"),
            ("ingredient-1", "2,slices,bread"),
        ]);
        app.control_add_recipe(draft, &cancel).await.unwrap();
        assert_eq!(app.location.recipe_id(), Some("new-1"));
        assert!(app.upload_view.view().is_open());
        assert!(app.store.bookmarks().contains("new-1"));

        assert!(!app.close_upload_window_if_due());
        assert!(app.upload_view.view().is_open());

        tokio::time::advance(app.modal_close).await;
        assert!(app.close_upload_window_if_due());
        assert!(!app.upload_view.view().is_open());
        assert!(!app.close_upload_window_if_due());
    }

    #[tokio::test]
    async fn test_largest_servings_count_renders() {
        let mut app = app();
        let cancel = CancellationToken::new();
        app.location.navigate("r1");
        app.control_recipe(&cancel).await.unwrap();
        app.control_servings(u32::MAX).unwrap();
        let plus = app
            .recipe_view
            .target()
            .find_all_by_class(crate::views::recipe::UPDATE_SERVINGS_CLASS)[1]
            .attr("data-update-to")
            .map(str::to_string);
        assert_eq!(plus, Some(u32::MAX.to_string()));
    }

    #[test]
    fn test_servings_without_recipe_is_an_error() {
        let mut app = app();
        assert!(app.control_servings(3).is_err());
        assert!(app.control_servings(0).is_ok());
    }
}
