use crate::filter::filter;
use crate::registry::Profile;

/// Which control currently receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Filter,
    List,
}

/// Picker state: the catalog, the live query and the view derived from them.
///
/// Every query change recomputes the visible list from scratch and drops the
/// selection.
#[derive(Debug, Clone)]
pub struct Picker {
    catalog: Vec<Profile>,
    query: String,
    visible: Vec<Profile>,
    focus: Focus,
    selected: Option<usize>,
}

impl Picker {
    #[must_use]
    pub fn new(catalog: Vec<Profile>) -> Self {
        let visible = catalog.clone();
        Self {
            catalog,
            query: String::new(),
            visible,
            focus: Focus::Filter,
            selected: None,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn visible(&self) -> &[Profile] {
        &self.visible
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.catalog.len()
    }

    #[must_use]
    pub fn focus(&self) -> Focus {
        self.focus
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn push_char(&mut self, ch: char) {
        self.focus = Focus::Filter;
        self.query.push(ch);
        self.refilter();
    }

    pub fn pop_char(&mut self) {
        self.focus = Focus::Filter;
        if self.query.pop().is_some() {
            self.refilter();
        } else {
            self.selected = None;
        }
    }

    /// Move focus from the filter into the list, selecting its first row.
    ///
    /// Returns `false` and leaves focus alone when nothing is visible.
    pub fn focus_list(&mut self) -> bool {
        if self.visible.is_empty() {
            return false;
        }
        self.focus = Focus::List;
        self.selected = Some(0);
        true
    }

    pub fn focus_filter(&mut self) {
        self.focus = Focus::Filter;
        self.selected = None;
    }

    /// Move the list selection by `delta`, clamped to the visible rows.
    ///
    /// Moving up from the first row hands focus back to the filter.
    pub fn move_selection(&mut self, delta: isize) {
        let Some(current) = self.selected else {
            if delta > 0 {
                self.focus_list();
            }
            return;
        };
        if delta < 0 && current == 0 {
            self.focus_filter();
            return;
        }
        let max_index = self.visible.len().saturating_sub(1);
        self.selected = Some(current.saturating_add_signed(delta).min(max_index));
    }

    pub fn select_first(&mut self) {
        self.focus_list();
    }

    pub fn select_last(&mut self) {
        if self.focus_list() {
            self.selected = Some(self.visible.len() - 1);
        }
    }

    /// Select a visible row directly, as a mouse click does.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.visible.len() {
            return false;
        }
        self.focus = Focus::List;
        self.selected = Some(index);
        true
    }

    /// Profile a confirm should launch: the selection, else the sole visible row.
    #[must_use]
    pub fn confirm(&self) -> Option<&Profile> {
        match self.selected {
            Some(index) => self.visible.get(index),
            None if self.visible.len() == 1 => self.visible.first(),
            None => None,
        }
    }

    #[must_use]
    pub fn counts_line(&self) -> String {
        format!(
            "Profiles: {} | Filtered: {}",
            self.total(),
            self.visible.len()
        )
    }

    fn refilter(&mut self) {
        self.visible = filter(&self.catalog, &self.query);
        self.selected = None;
        if self.visible.is_empty() {
            self.focus = Focus::Filter;
        }
    }
}
