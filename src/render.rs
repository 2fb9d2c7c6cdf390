//! Presentation renderer.
//!
//! Each view supplies a [`View`] capability (markup generation plus its
//! messages); [`Renderer`] owns that view's render-target subtree and moves it
//! through its lifecycle. The reconciliation algorithm itself is the free
//! function [`reconcile`].
//!
//! `reconcile` pairs nodes by position. It is only meaningful when the view's
//! template produces the same element shape on every call; a shape change is
//! reported as [`ShapeMismatch`] and [`Renderer::update`] falls back to a full
//! render.

use crate::dom::{escape, parse_fragment, Element, Node};

/// Per-view markup generation and messages.
pub trait View {
    type Data: ?Sized;

    fn generate_markup(&self, data: &Self::Data) -> String;

    /// Shown by the error state when no message is supplied.
    fn error_message(&self) -> &str;

    /// Shown by the success-message state.
    fn message(&self) -> &str {
        ""
    }

    /// Collections with no elements count as "no data" for [`Renderer::render`].
    fn is_empty(&self, _data: &Self::Data) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Rendered,
    ErrorShown,
}

/// The element counts of the fresh markup and the current subtree differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub expected: usize,
    pub found: usize,
}

/// Clear `target` and install `markup` as its children.
pub fn full_render(target: &mut Element, markup: &str) {
    target.children = parse_fragment(markup);
}

/// Patch `target` in place so it shows `markup`, touching only what changed.
///
/// The element sequences of the fresh markup and of `target` are walked in
/// document order in lock-step. For each pair that is not structurally equal:
/// if the fresh element's first child is non-blank text that differs from the
/// current text, the current element's text content is replaced; then every
/// attribute of the fresh element is copied onto the current one. Returns the
/// number of elements touched.
pub fn reconcile(target: &mut Element, markup: &str) -> Result<usize, ShapeMismatch> {
    let fresh_nodes = parse_fragment(markup);
    let mut fresh: Vec<&Element> = Vec::new();
    for node in &fresh_nodes {
        if let Node::Element(el) = node {
            fresh.push(el);
            fresh.extend(el.descendants());
        }
    }

    let found = target.descendant_count();
    if fresh.len() != found {
        return Err(ShapeMismatch {
            expected: fresh.len(),
            found,
        });
    }

    let mut cursor = 0;
    let mut touched = 0;
    patch_children(&mut target.children, &fresh, &mut cursor, &mut touched);
    Ok(touched)
}

fn patch_children(
    children: &mut [Node],
    fresh: &[&Element],
    cursor: &mut usize,
    touched: &mut usize,
) {
    for node in children {
        let Node::Element(current) = node else {
            continue;
        };
        let Some(new_el) = fresh.get(*cursor).copied() else {
            return;
        };
        *cursor += 1;

        if new_el.is_equal_node(current) {
            patch_children(&mut current.children, fresh, cursor, touched);
            continue;
        }
        *touched += 1;

        let new_text = match new_el.first_child() {
            Some(Node::Text(t)) if !t.trim().is_empty() => Some(new_el.text_content()),
            _ => None,
        };
        let replaced = match new_text {
            Some(text) if text != current.text_content() => {
                // The replaced subtree's elements still own their slots in
                // the fresh sequence; skip past them.
                *cursor += current.descendant_count();
                current.set_text_content(&text);
                true
            }
            _ => false,
        };

        for (name, value) in &new_el.attrs {
            current.set_attribute(name, value);
        }

        if !replaced {
            patch_children(&mut current.children, fresh, cursor, touched);
        }
    }
}

/// Owns one view's render-target subtree.
pub struct Renderer<V: View> {
    view: V,
    target: Element,
    phase: ViewPhase,
}

impl<V: View> Renderer<V> {
    /// `container` is the tag of the subtree root, e.g. `"div"`.
    pub fn new(view: V, container: &str) -> Self {
        Self {
            view,
            target: Element::new(container),
            phase: ViewPhase::Idle,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn target(&self) -> &Element {
        &self.target
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// Fully render `data`. Absent or empty data renders the error state
    /// with the view's default message instead.
    pub fn render(&mut self, data: Option<&V::Data>) {
        match data {
            Some(data) if !self.view.is_empty(data) => {
                let markup = self.view.generate_markup(data);
                full_render(&mut self.target, &markup);
                self.phase = ViewPhase::Rendered;
            }
            _ => self.render_error(None),
        }
    }

    /// Reconcile the subtree against freshly generated markup for `data`.
    /// Callers must pass real data; no empty-data substitution happens here.
    pub fn update(&mut self, data: &V::Data) {
        let markup = self.view.generate_markup(data);
        match reconcile(&mut self.target, &markup) {
            Ok(touched) => tracing::trace!(touched, "view reconciled"),
            Err(mismatch) => {
                tracing::warn!(
                    expected = mismatch.expected,
                    found = mismatch.found,
                    "view shape changed between renders; re-rendering"
                );
                full_render(&mut self.target, &markup);
            }
        }
        self.phase = ViewPhase::Rendered;
    }

    pub fn render_spinner(&mut self) {
        full_render(&mut self.target, SPINNER_MARKUP);
        self.phase = ViewPhase::Loading;
    }

    pub fn render_error(&mut self, message: Option<&str>) {
        let message = message.unwrap_or_else(|| self.view.error_message());
        let markup = format!(
            r#"<div class="error"><span class="icon">!</span><p>{}</p></div>"#,
            escape(message, false)
        );
        full_render(&mut self.target, &markup);
        self.phase = ViewPhase::ErrorShown;
    }

    pub fn render_message(&mut self, message: Option<&str>) {
        let message = message.unwrap_or_else(|| self.view.message());
        let markup = format!(
            r#"<div class="message"><span class="icon">*</span><p>{}</p></div>"#,
            escape(message, false)
        );
        full_render(&mut self.target, &markup);
        self.phase = ViewPhase::Rendered;
    }
}

const SPINNER_MARKUP: &str = r#"<div class="spinner"><span>Loading...</span></div>"#;
