use crate::dom::escape;
use crate::render::View;
use crate::types::RecipeSummary;

/// A list of recipe previews plus the id currently open, which gets the
/// active highlight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewList {
    pub items: Vec<RecipeSummary>,
    pub active_id: Option<String>,
}

impl PreviewList {
    pub fn new(items: Vec<RecipeSummary>, active_id: Option<&str>) -> Self {
        Self {
            items,
            active_id: active_id.map(str::to_string),
        }
    }
}

pub const ACTIVE_CLASS: &str = "preview__link--active";

/// Preview list used by both the search results and the bookmarks panel;
/// they differ only in their empty-state message.
#[derive(Debug)]
pub struct PreviewView {
    error_message: &'static str,
}

impl PreviewView {
    pub fn results() -> Self {
        Self {
            error_message: "No recipes found for your query! Please try again ;)",
        }
    }

    pub fn bookmarks() -> Self {
        Self {
            error_message: "No bookmarks yet. Find a nice recipe and bookmark it ;)",
        }
    }
}

impl View for PreviewView {
    type Data = PreviewList;

    fn generate_markup(&self, list: &PreviewList) -> String {
        list.items
            .iter()
            .map(|item| preview_markup(item, list.active_id.as_deref() == Some(item.id.as_str())))
            .collect()
    }

    fn error_message(&self) -> &str {
        self.error_message
    }

    fn is_empty(&self, list: &PreviewList) -> bool {
        list.items.is_empty()
    }
}

fn preview_markup(item: &RecipeSummary, active: bool) -> String {
    format!(
        concat!(
            r#"<li class="preview"><a class="preview__link{active}" href="{href}">"#,
            r#"<figure class="preview__fig"><img src="{img}" alt="{alt}"></figure>"#,
            r#"<div class="preview__data"><h4 class="preview__title">{title}</h4>"#,
            r#"<p class="preview__publisher">{publisher}</p>"#,
            r#"<div class="preview__user-generated{hidden}">user recipe</div>"#,
            r#"</div></a></li>"#,
        ),
        active = if active { " preview__link--active" } else { "" },
        href = escape(&format!("#{}", item.id), true),
        img = escape(&item.image, true),
        alt = escape(&item.title, true),
        title = escape(&item.title, false),
        publisher = escape(&item.publisher, false),
        hidden = if item.key.is_some() { "" } else { " hidden" },
    )
}
