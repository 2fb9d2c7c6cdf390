use crate::render::View;
use crate::types::SearchState;

/// Class of both pagination buttons; each carries `data-goto`.
pub const PAGINATION_CLASS: &str = "pagination__btn";

/// Which page controls to show and the page each one leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageControls {
    pub prev: Option<usize>,
    pub next: Option<usize>,
}

/// Controls for `current` out of `num_pages`: none for a single page, "next"
/// on the first page, "previous" on the last, both in between.
pub fn page_controls(current: usize, num_pages: usize) -> PageControls {
    if num_pages <= 1 {
        return PageControls::default();
    }
    if current == 1 {
        return PageControls {
            prev: None,
            next: Some(2),
        };
    }
    if current == num_pages {
        return PageControls {
            prev: Some(num_pages - 1),
            next: None,
        };
    }
    if current > 1 && current < num_pages {
        return PageControls {
            prev: Some(current - 1),
            next: Some(current + 1),
        };
    }
    PageControls::default()
}

#[derive(Debug, Default)]
pub struct PaginationView;

impl View for PaginationView {
    type Data = SearchState;

    fn generate_markup(&self, search: &SearchState) -> String {
        let controls = page_controls(search.current_page, search.num_pages());
        let mut out = String::new();
        if let Some(page) = controls.prev {
            out.push_str(&format!(
                r#"<button data-goto="{page}" class="btn--inline {PAGINATION_CLASS} {PAGINATION_CLASS}--prev"><span>← Page {page}</span></button>"#
            ));
        }
        if let Some(page) = controls.next {
            out.push_str(&format!(
                r#"<button data-goto="{page}" class="btn--inline {PAGINATION_CLASS} {PAGINATION_CLASS}--next"><span>Page {page} →</span></button>"#
            ));
        }
        out
    }

    fn error_message(&self) -> &str {
        "Could not paginate the results."
    }
}
