//! View derivation: `(trace, filter, sort) -> view`
//!
//! Always rebuilt from the full trace. Never patched incrementally.

use crate::entry::Entry;
use crate::filter::FilterCriteria;
use crate::sort::SortCriteria;
use std::sync::Arc;

/// Indices into `trace` of the entries that pass `filter`, ordered by `sort`
pub fn derive_view(trace: &[Arc<Entry>], filter: &FilterCriteria, sort: &SortCriteria) -> Vec<usize> {
    let matcher = filter.matcher();
    let mut view: Vec<usize> = trace
        .iter()
        .enumerate()
        .filter(|(_, entry)| matcher.matches(entry))
        .map(|(index, _)| index)
        .collect();
    sort.sort_indices(trace, &mut view);
    view
}
