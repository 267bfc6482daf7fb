//! Command implementations

pub mod summary;
pub mod view;

use harscope_core::{FilterType, SortDirection, SortKey, TraceStore};

/// View criteria given on the command line
#[derive(Debug, Clone, Default)]
pub struct Presets {
    pub filter: Option<String>,
    pub types: Vec<FilterType>,
    pub sort: Option<String>,
    pub desc: bool,
}

impl Presets {
    /// Apply the presets to a store
    pub fn apply(&self, store: &mut TraceStore) {
        if let Some(text) = &self.filter {
            store.set_filter_text(text.clone());
        }
        for filter_type in &self.types {
            if !store.filter().types.contains(*filter_type) {
                store.toggle_category(*filter_type);
            }
        }

        let key = self.sort.as_deref().map(SortKey::parse).unwrap_or_default();
        let direction = if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        store.set_sort(key, direction);
    }
}
