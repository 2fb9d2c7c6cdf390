/// The addressable fragment of the current location (`#<recipe id>`).
///
/// `navigate` is a user-initiated change and reports whether the views should
/// react; `push_state` records an id without triggering that reaction, the
/// way a history push does after a successful submission.
#[derive(Debug, Clone, Default)]
pub struct Location {
    fragment: String,
    history: Vec<String>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recipe id held in the fragment, if any.
    pub fn recipe_id(&self) -> Option<&str> {
        if self.fragment.is_empty() {
            None
        } else {
            Some(&self.fragment)
        }
    }

    /// Move to `fragment`. Returns true when it differs from the current
    /// one, i.e. when a change event would fire.
    pub fn navigate(&mut self, fragment: &str) -> bool {
        let next = normalize(fragment);
        if next == self.fragment {
            return false;
        }
        self.history.push(std::mem::replace(&mut self.fragment, next));
        true
    }

    /// Record `id` as the current fragment without signalling a change.
    pub fn push_state(&mut self, id: &str) {
        let next = normalize(id);
        if next != self.fragment {
            self.history.push(std::mem::replace(&mut self.fragment, next));
        }
    }

    /// Go back one entry. Returns true if the fragment changed.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                let changed = prev != self.fragment;
                self.fragment = prev;
                changed
            }
            None => false,
        }
    }
}

fn normalize(fragment: &str) -> String {
    fragment.trim().trim_start_matches('#').to_string()
}
