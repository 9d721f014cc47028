//! Searchable combobox.
//!
//! A text input over a fixed option list. Typing filters the list by
//! case-insensitive prefix; arrow keys move a wrapping highlight; Enter or a
//! click commits an option. The widget does not own the committed value:
//! every handler that commits one returns it as `Some(value)` for the caller
//! to apply, and external changes come back in through [`set_value`].
//!
//! Blur and selection are two-phase because the widget cannot run timers
//! itself. [`blur`] returns the grace period after which the caller reports
//! [`blur_grace_elapsed`]; after a selection the caller waits
//! [`SELECTION_SETTLE`] and reports [`selection_settled`].
//!
//! [`set_value`]: SearchableDropdown::set_value
//! [`blur`]: SearchableDropdown::blur
//! [`blur_grace_elapsed`]: SearchableDropdown::blur_grace_elapsed
//! [`selection_settled`]: SearchableDropdown::selection_settled

use std::time::Duration;

/// Delay between losing focus and closing.
pub const BLUR_GRACE: Duration = Duration::from_millis(100);

/// Delay after a selection before blur handling resumes.
pub const SELECTION_SETTLE: Duration = Duration::from_millis(50);

/// Keys the widget reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownKey {
    Enter,
    ArrowDown,
    ArrowUp,
    Escape,
    Other,
}

/// Coarse widget state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    Closed,
    /// Open with every option listed.
    OpenUnfiltered,
    /// Open with options narrowed by the search term.
    OpenFiltered,
}

/// One row of the open list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView<'a> {
    pub label: &'a str,
    pub highlighted: bool,
    /// Equal to the committed value.
    pub selected: bool,
}

/// Combobox state for one input.
#[derive(Debug, Clone, Default)]
pub struct SearchableDropdown {
    options: Vec<String>,
    value: String,
    search_term: String,
    display_value: String,
    /// Indices into `options` matching the search term.
    filtered: Vec<usize>,
    highlighted: Option<usize>,
    open: bool,
    focused: bool,
    selecting: bool,
    label: String,
    disabled: bool,
}

impl SearchableDropdown {
    /// Create a closed widget showing `value`.
    #[must_use]
    pub fn new(options: Vec<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut dropdown = Self {
            options,
            display_value: value.clone(),
            value,
            ..Self::default()
        };
        dropdown.refilter();
        dropdown
    }

    /// Set the floating label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Disable or enable input handling.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Replace the option list.
    pub fn set_options(&mut self, options: Vec<String>) {
        self.options = options;
        self.refilter();
    }

    /// Apply a change of the committed value made outside the widget.
    ///
    /// While closed, the input text follows the value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        if !self.open {
            self.sync_display();
        }
    }

    // =========================================================================
    // Event handlers
    // =========================================================================

    /// The input gained focus.
    pub fn focus(&mut self) {
        if self.disabled {
            return;
        }
        self.focused = true;
        self.open = true;
    }

    /// The input text changed.
    ///
    /// Returns the new committed value when the text matches an option exactly
    /// (ignoring case) or is empty.
    pub fn input(&mut self, text: impl Into<String>) -> Option<String> {
        if self.disabled {
            return None;
        }
        let text = text.into();
        self.search_term.clone_from(&text);
        self.display_value.clone_from(&text);
        self.open = true;
        self.refilter();

        let lowered = text.to_lowercase();
        let committed = if let Some(exact) = self
            .options
            .iter()
            .find(|option| option.to_lowercase() == lowered)
        {
            Some(exact.clone())
        } else if text.is_empty() {
            Some(String::new())
        } else {
            None
        };
        if let Some(value) = &committed {
            self.value.clone_from(value);
        }
        committed
    }

    /// An option was clicked. Returns the committed value.
    pub fn select_option(&mut self, option: &str) -> Option<String> {
        if self.disabled {
            return None;
        }
        self.selecting = true;
        self.value = option.to_string();
        self.close();
        Some(self.value.clone())
    }

    /// [`SELECTION_SETTLE`] has passed since a selection. Releases focus.
    pub fn selection_settled(&mut self) {
        self.selecting = false;
        self.focused = false;
    }

    /// The clear control was pressed. Focus returns to the input.
    pub fn clear(&mut self) -> Option<String> {
        if self.disabled {
            return None;
        }
        self.display_value.clear();
        self.search_term.clear();
        self.value.clear();
        self.refilter();
        self.focus();
        Some(String::new())
    }

    /// The input lost focus.
    ///
    /// Returns the grace period after which [`blur_grace_elapsed`] should be
    /// called, or `None` when the blur comes from a selection in progress.
    ///
    /// [`blur_grace_elapsed`]: SearchableDropdown::blur_grace_elapsed
    pub fn blur(&mut self) -> Option<Duration> {
        self.focused = false;
        if self.selecting {
            return None;
        }
        Some(BLUR_GRACE)
    }

    /// The blur grace period elapsed. Closes unless focus moved elsewhere
    /// inside the widget.
    pub fn blur_grace_elapsed(&mut self, focus_within: bool) {
        if !focus_within && self.open && !self.selecting {
            self.close();
        }
    }

    /// A pointer press landed outside the widget.
    pub fn click_outside(&mut self) {
        self.close();
    }

    /// A key was pressed in the input. Returns the committed value when the
    /// key selects an option.
    pub fn key_down(&mut self, key: DropdownKey) -> Option<String> {
        if self.disabled {
            return None;
        }
        if !self.open {
            if matches!(key, DropdownKey::Enter | DropdownKey::ArrowDown) {
                self.open = true;
            }
            return None;
        }

        let len = self.filtered.len();
        match key {
            DropdownKey::ArrowDown => {
                self.highlighted = match self.highlighted {
                    _ if len == 0 => None,
                    Some(i) if i + 1 < len => Some(i + 1),
                    _ => Some(0),
                };
                None
            }
            DropdownKey::ArrowUp => {
                self.highlighted = match self.highlighted {
                    _ if len == 0 => None,
                    Some(i) if i > 0 => Some(i - 1),
                    _ => Some(len - 1),
                };
                None
            }
            DropdownKey::Enter => {
                let target = self
                    .highlighted
                    .and_then(|i| self.filtered.get(i))
                    .or_else(|| match self.filtered.as_slice() {
                        [only] => Some(only),
                        _ => None,
                    })
                    .and_then(|&index| self.options.get(index))
                    .cloned();
                target.and_then(|option| self.select_option(&option))
            }
            DropdownKey::Escape => {
                self.close();
                self.focused = false;
                None
            }
            DropdownKey::Other => None,
        }
    }

    fn close(&mut self) {
        self.open = false;
        self.search_term.clear();
        self.refilter();
        self.sync_display();
    }

    fn sync_display(&mut self) {
        self.display_value.clone_from(&self.value);
        self.search_term.clear();
    }

    /// Recompute matches and reset the highlight.
    fn refilter(&mut self) {
        let term = self.search_term.to_lowercase();
        if term.trim().is_empty() {
            self.filtered = (0..self.options.len()).collect();
            self.highlighted = None;
        } else {
            self.filtered = self
                .options
                .iter()
                .enumerate()
                .filter(|(_, option)| option.to_lowercase().starts_with(&term))
                .map(|(i, _)| i)
                .collect();
            self.highlighted = if self.filtered.is_empty() {
                None
            } else {
                Some(0)
            };
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DropdownState {
        if !self.open {
            DropdownState::Closed
        } else if self.search_term.trim().is_empty() {
            DropdownState::OpenUnfiltered
        } else {
            DropdownState::OpenFiltered
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Committed value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Text in the input.
    #[must_use]
    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Position of the highlight in [`filtered_options`].
    ///
    /// [`filtered_options`]: SearchableDropdown::filtered_options
    #[must_use]
    pub const fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Options matching the search term.
    #[must_use]
    pub fn filtered_options(&self) -> Vec<&str> {
        self.filtered
            .iter()
            .filter_map(|&i| self.options.get(i).map(String::as_str))
            .collect()
    }

    /// Rows of the open list; empty while closed.
    #[must_use]
    pub fn option_views(&self) -> Vec<OptionView<'_>> {
        if !self.open {
            return Vec::new();
        }
        self.filtered_options()
            .into_iter()
            .enumerate()
            .map(|(i, label)| OptionView {
                label,
                highlighted: self.highlighted == Some(i),
                selected: label == self.value,
            })
            .collect()
    }

    /// Message shown in place of an empty open list.
    #[must_use]
    pub fn no_options_message(&self) -> Option<String> {
        (self.open && self.filtered.is_empty())
            .then(|| format!("No brands found matching \"{}\"", self.search_term))
    }

    /// Whether the clear control is shown.
    #[must_use]
    pub fn is_clearable(&self) -> bool {
        !self.value.is_empty()
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the label floats above the input.
    #[must_use]
    pub fn has_floating_label(&self) -> bool {
        !self.label.is_empty()
            && (!self.display_value.is_empty() || self.open || !self.value.is_empty())
    }
}
