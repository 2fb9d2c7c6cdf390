use std::fmt::Write as _;

use crate::dom::escape;
use crate::draft::RecipeDraft;
use crate::render::View;

/// Number of ingredient fields the blank form offers.
pub const INGREDIENT_SLOTS: usize = 6;

/// The submission window: a form over a [`RecipeDraft`], plus whether the
/// window is open.
#[derive(Debug, Default)]
pub struct UploadView {
    open: bool,
}

impl UploadView {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_window(&mut self) {
        self.open = true;
    }

    pub fn hide_window(&mut self) {
        self.open = false;
    }
}

impl View for UploadView {
    type Data = RecipeDraft;

    fn generate_markup(&self, draft: &RecipeDraft) -> String {
        let mut out = String::from(r#"<form class="upload"><div class="upload__column"><h3 class="upload__heading">Recipe data</h3>"#);
        for (name, label, value) in [
            ("title", "Title", &draft.title),
            ("sourceUrl", "URL", &draft.source_url),
            ("image", "Image URL", &draft.image),
            ("publisher", "Publisher", &draft.publisher),
            ("cookingTime", "Prep time", &draft.cooking_time),
            ("servings", "Servings", &draft.servings),
        ] {
            field_markup(&mut out, name, label, value);
        }
        out.push_str(r#"</div><div class="upload__column"><h3 class="upload__heading">Ingredients</h3>"#);

        let slots = draft.ingredients.len().max(INGREDIENT_SLOTS);
        for i in 0..slots {
            let (name, value) = match draft.ingredients.get(i) {
                Some((name, value)) => (name.clone(), value.as_str()),
                None => (format!("ingredient-{}", i + 1), ""),
            };
            field_markup(&mut out, &name, &format!("Ingredient {}", i + 1), value);
        }
        out.push_str(r#"</div><button class="btn upload__btn"><span>Upload</span></button></form>"#);
        out
    }

    fn error_message(&self) -> &str {
        "Wrong ingredient format! Please use the format quantity,unit,description."
    }

    fn message(&self) -> &str {
        "Recipe was successfully uploaded :)"
    }
}

fn field_markup(out: &mut String, name: &str, label: &str, value: &str) {
    let _ = write!(
        out,
        r#"<label>{label}</label><input value="{value}" name="{name}" type="text">"#,
        label = escape(label, false),
        value = escape(value, true),
        name = escape(name, true),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Renderer, ViewPhase};

    #[test]
    fn test_form_lists_named_fields_and_ingredient_slots() {
        let draft = RecipeDraft::from_fields([("title", "Soup"), ("ingredient-1", "1,l,water")]);
        let mut r = Renderer::new(UploadView::default(), "div");
        r.render(Some(&draft));
        let inputs: Vec<_> = r
            .target()
            .descendants()
            .into_iter()
            .filter(|el| el.tag == "input")
            .collect();
        assert_eq!(inputs.len(), 6 + INGREDIENT_SLOTS);
        assert_eq!(inputs[0].attr("value"), Some("Soup"));
        assert_eq!(inputs[6].attr("name"), Some("ingredient-1"));
        assert_eq!(inputs[6].attr("value"), Some("1,l,water"));
    }

    #[test]
    fn test_window_toggles_and_message() {
        let mut r = Renderer::new(UploadView::default(), "div");
        r.view_mut().open_window();
        assert!(r.view().is_open());
        r.render_message(None);
        assert_eq!(r.phase(), ViewPhase::Rendered);
        assert!(r.target().text_content().contains("successfully uploaded"));
        r.view_mut().hide_window();
        assert!(!r.view().is_open());
    }
}
