use std::fmt::Write as _;

use crate::dom::escape;
use crate::render::View;
use crate::types::{Ingredient, Recipe};

use super::format_quantity;

/// Class of the servings buttons; each carries `data-update-to`.
pub const UPDATE_SERVINGS_CLASS: &str = "btn--update-servings";
pub const BOOKMARK_CLASS: &str = "btn--bookmark";

#[derive(Debug, Default)]
pub struct RecipeView;

impl View for RecipeView {
    type Data = Recipe;

    fn generate_markup(&self, recipe: &Recipe) -> String {
        let title = escape(&recipe.title, false);
        let mut out = String::new();

        let _ = write!(
            out,
            r#"<figure class="recipe__fig"><img src="{img}" alt="{alt}" class="recipe__img"><h1 class="recipe__title"><span>{title}</span></h1></figure>"#,
            img = escape(&recipe.image, true),
            alt = escape(&recipe.title, true),
        );

        let _ = write!(
            out,
            concat!(
                r#"<div class="recipe__details">"#,
                r#"<div class="recipe__info"><span class="recipe__info-data recipe__info-data--minutes">{minutes}</span><span class="recipe__info-text">minutes</span></div>"#,
                r#"<div class="recipe__info"><span class="recipe__info-data recipe__info-data--people">{servings}</span><span class="recipe__info-text">servings</span>"#,
                r#"<div class="recipe__info-buttons">"#,
                r#"<button class="btn--tiny {cls}" data-update-to="{less}">-</button>"#,
                r#"<button class="btn--tiny {cls}" data-update-to="{more}">+</button>"#,
                r#"</div></div>"#,
                r#"<div class="recipe__user-generated{hidden}">user recipe</div>"#,
                r#"<button class="btn--round {bcls}" data-bookmarked="{bookmarked}">{bookmark_label}</button>"#,
                r#"</div>"#,
            ),
            minutes = recipe.cooking_time,
            servings = recipe.servings,
            cls = UPDATE_SERVINGS_CLASS,
            less = recipe.servings.saturating_sub(1),
            more = recipe.servings.saturating_add(1),
            hidden = if recipe.key.is_some() { "" } else { " hidden" },
            bcls = BOOKMARK_CLASS,
            bookmarked = recipe.bookmarked,
            bookmark_label = if recipe.bookmarked { "Bookmarked" } else { "Bookmark" },
        );

        out.push_str(r#"<div class="recipe__ingredients"><h2 class="heading--2">Recipe ingredients</h2><ul class="recipe__ingredient-list">"#);
        for ingredient in &recipe.ingredients {
            out.push_str(&ingredient_markup(ingredient));
        }
        out.push_str("</ul></div>");

        let _ = write!(
            out,
            concat!(
                r#"<div class="recipe__directions"><h2 class="heading--2">How to cook it</h2>"#,
                r#"<p class="recipe__directions-text">This recipe was carefully designed and tested by <span class="recipe__publisher">{publisher}</span>. Please check out directions at their website.</p>"#,
                r#"<a class="btn--small recipe__btn" href="{url}" target="_blank"><span>Directions</span></a></div>"#,
            ),
            publisher = escape(&recipe.publisher, false),
            url = escape(&recipe.source_url, true),
        );
        out
    }

    fn error_message(&self) -> &str {
        "We could not find that recipe. Please try another one!"
    }

    fn message(&self) -> &str {
        "Start by searching for a recipe or an ingredient. Have fun!"
    }
}

fn ingredient_markup(ingredient: &Ingredient) -> String {
    format!(
        r#"<li class="recipe__ingredient"><span class="recipe__quantity">{}</span><span class="recipe__unit">{}</span><span class="recipe__description">{}</span></li>"#,
        ingredient.quantity.map(format_quantity).unwrap_or_default(),
        escape(&ingredient.unit, false),
        escape(&ingredient.description, false),
    )
}
