//! Property-based tests for the store's scaling, paging and persistence
//! invariants.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use recipe_lookup::db::MemoryBookmarkStorage;
use recipe_lookup::error::AppError;
use recipe_lookup::gateway::{Gateway, Target};
use recipe_lookup::store::RecipeStore;
use recipe_lookup::types::{Ingredient, Recipe, RecipeSummary, SearchState};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

/// Serves one fixed recipe body and one fixed search body.
struct Catalog {
    recipe: Value,
    search: Value,
}

impl Catalog {
    fn with_recipe(servings: u32, quantities: &[Option<f64>]) -> Self {
        let ingredients: Vec<Value> = quantities
            .iter()
            .map(|q| json!({ "quantity": q, "unit": "g", "description": "thing" }))
            .collect();
        Self {
            recipe: json!({ "data": { "recipe": {
                "id": "p", "title": "Prop", "publisher": "Kitchen",
                "source_url": "https://example.com", "image_url": "",
                "servings": servings, "cooking_time": 20,
                "ingredients": ingredients
            }}}),
            search: json!({ "data": { "recipes": [] } }),
        }
    }

    fn with_results(n: usize) -> Self {
        let recipes: Vec<Value> = (0..n)
            .map(|i| json!({ "id": format!("s{i}"), "title": "Soup", "publisher": "P", "image_url": "" }))
            .collect();
        Self {
            recipe: Value::Null,
            search: json!({ "data": { "recipes": recipes } }),
        }
    }
}

#[async_trait]
impl Gateway for Catalog {
    async fn call(
        &self,
        target: &Target,
        _payload: Option<&Value>,
        _cancel: &CancellationToken,
    ) -> Result<Value, AppError> {
        match target {
            Target::Recipe(_) => Ok(self.recipe.clone()),
            Target::Search(_) => Ok(self.search.clone()),
            Target::Upload => Err(AppError::Network {
                message: "read only".into(),
                status: 403,
            }),
        }
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn store(gateway: Catalog) -> RecipeStore<Catalog, Arc<MemoryBookmarkStorage>> {
    RecipeStore::new(gateway, Arc::new(MemoryBookmarkStorage::new()), 10).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Quarter steps survive a trip through JSON text exactly.
fn arb_quantity() -> impl Strategy<Value = Option<f64>> {
    prop::option::of((0u32..4000).prop_map(|k| f64::from(k) / 4.0))
}

fn arb_ingredient() -> impl Strategy<Value = Ingredient> {
    (arb_quantity(), "[a-z]{0,6}", "[a-z ]{1,20}").prop_map(|(quantity, unit, description)| {
        Ingredient {
            quantity,
            unit,
            description,
        }
    })
}

fn arb_recipe() -> impl Strategy<Value = Recipe> {
    (
        "[A-Za-z &<>\"']{1,24}",
        "[A-Za-z ]{0,12}",
        1u32..200,
        0u32..600,
        prop::collection::vec(arb_ingredient(), 0..6),
        prop::option::of("[a-f0-9]{8}"),
    )
        .prop_map(|(title, publisher, servings, cooking_time, ingredients, key)| Recipe {
            id: String::new(),
            title,
            publisher,
            source_url: "https://example.com/r".into(),
            image: "https://example.com/r.jpg".into(),
            servings,
            cooking_time,
            ingredients,
            bookmarked: false,
            key,
        })
}

fn summaries(n: usize) -> Vec<RecipeSummary> {
    (0..n)
        .map(|i| RecipeSummary {
            id: format!("s{i}"),
            title: String::new(),
            publisher: String::new(),
            image: String::new(),
            key: None,
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_servings_scale_jointly_and_restore(
        original in 1u32..500,
        target in 1u32..100_000,
        quantities in prop::collection::vec(prop::option::of(0.0f64..1000.0), 0..8),
    ) {
        let mut store = store(Catalog::with_recipe(original, &quantities));
        let cancel = CancellationToken::new();
        block_on(store.load_recipe("p", &cancel)).unwrap();

        let scaled = store.update_servings(target).unwrap().clone();
        prop_assert_eq!(scaled.servings, target);
        for (q0, ingredient) in quantities.iter().zip(&scaled.ingredients) {
            match (q0, ingredient.quantity) {
                (Some(q0), Some(q1)) => {
                    let expected = q0 * f64::from(target) / f64::from(original);
                    prop_assert!(close(q1, expected), "{} != {}", q1, expected);
                }
                (None, None) => {}
                other => prop_assert!(false, "quantity presence changed: {:?}", other),
            }
        }

        let restored = store.update_servings(original).unwrap();
        prop_assert_eq!(restored.servings, original);
        for (q0, ingredient) in quantities.iter().zip(&restored.ingredients) {
            match (q0, ingredient.quantity) {
                (Some(q0), Some(q1)) => prop_assert!(close(q1, *q0), "{} != {}", q1, q0),
                (None, None) => {}
                other => prop_assert!(false, "quantity presence changed: {:?}", other),
            }
        }
    }

    #[test]
    fn prop_pages_partition_the_results(n in 0usize..80, per_page in 1usize..15, page in 0usize..12) {
        let mut search = SearchState::new(per_page);
        search.results = summaries(n);
        let pages = search.num_pages();
        prop_assert_eq!(pages, n.div_ceil(per_page));

        let mut joined = Vec::new();
        for p in 1..=pages {
            let slice = search.page_slice(p);
            prop_assert!(!slice.is_empty());
            prop_assert!(slice.len() <= per_page);
            if p < pages {
                prop_assert_eq!(slice.len(), per_page);
            }
            joined.extend_from_slice(slice);
        }
        prop_assert_eq!(&joined, &search.results);

        if page == 0 || page > pages {
            prop_assert!(search.page_slice(page).is_empty());
        }
    }

    #[test]
    fn prop_page_pointer_stays_in_bounds(n in 0usize..60, requests in prop::collection::vec(0usize..12, 1..6)) {
        let mut store = store(Catalog::with_results(n));
        let cancel = CancellationToken::new();
        block_on(store.load_search_results("soup", &cancel)).unwrap();

        for page in requests {
            let len = store.page(Some(page)).len();
            let expected = store.search().page_slice(page).len();
            prop_assert_eq!(len, expected);
            let current = store.search().current_page;
            prop_assert!(current >= 1 && current <= store.search().last_page());
        }
    }

    #[test]
    fn prop_bookmarks_rehydrate_identically(
        recipes in prop::collection::vec(arb_recipe(), 0..8),
        removals in prop::collection::vec(any::<bool>(), 8),
    ) {
        let storage = Arc::new(MemoryBookmarkStorage::new());
        let saved = {
            let mut store = RecipeStore::new(Catalog::with_results(0), Arc::clone(&storage), 10).unwrap();
            for (i, mut recipe) in recipes.into_iter().enumerate() {
                recipe.id = format!("r{i}");
                store.add_bookmark(recipe).unwrap();
            }
            for (i, remove) in removals.iter().enumerate() {
                if *remove {
                    store.delete_bookmark(&format!("r{i}")).unwrap();
                }
            }
            store.bookmarks().clone()
        };

        let reopened = RecipeStore::new(Catalog::with_results(0), storage, 10).unwrap();
        prop_assert_eq!(reopened.bookmarks(), &saved);
    }
}
