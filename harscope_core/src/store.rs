//! Trace store: canonical entries, criteria, derived view and selection
//!
//! The store is the single owner of mutable viewer state. Every mutation that
//! can change the view (new entries, filter, sort) rebuilds it exactly once
//! via [`derive_view`]; readers (the table window, the timeline, the key
//! handler) only ever see the finished result.

use crate::entry::{Entry, EntryId};
use crate::filter::{FilterCriteria, FilterType};
use crate::har::HarEntry;
use crate::sort::{SortCriteria, SortDirection, SortKey};
use crate::stats::TraceStats;
use crate::view::derive_view;
use std::sync::Arc;

/// Handle for an in-flight import, see [`TraceStore::begin_import`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    seq: u64,
    epoch: u64,
}

/// What happened to a finished import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Entries replaced the trace
    Applied(usize),
    /// A newer import was started, or the trace was replaced or cleared
    /// since this one began; state is untouched
    Stale,
}

/// Owner of the trace, the filter/sort criteria, the view and the selection
#[derive(Debug)]
pub struct TraceStore {
    trace: Vec<Arc<Entry>>,
    view: Vec<usize>,
    filter: FilterCriteria,
    sort: SortCriteria,
    selected: Option<EntryId>,
    detail_open: bool,
    recording: bool,
    next_id: u64,
    /// Bumped on every view rebuild
    revision: u64,
    /// Bumped whenever trace contents change
    generation: u64,
    /// Bumped when the trace is replaced or cleared
    epoch: u64,
    import_seq: u64,
    import_pending: bool,
    stats: TraceStats,
    /// Trace generation the totals in `stats` were computed for
    stats_generation: u64,
    stats_computations: u64,
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceStore {
    pub fn new() -> Self {
        Self {
            trace: Vec::new(),
            view: Vec::new(),
            filter: FilterCriteria::default(),
            sort: SortCriteria::default(),
            selected: None,
            detail_open: false,
            recording: true,
            next_id: 1,
            revision: 0,
            generation: 0,
            epoch: 0,
            import_seq: 0,
            import_pending: false,
            stats: TraceStats::default(),
            stats_generation: 0,
            stats_computations: 0,
        }
    }

    // ------------------------------------------------------------------
    // Trace mutations
    // ------------------------------------------------------------------

    /// Replace the whole trace. Clears the selection.
    pub fn set_entries(&mut self, records: Vec<HarEntry>) {
        let trace: Vec<_> = records.into_iter().map(|r| self.admit(r)).collect();
        self.trace = trace;
        self.generation += 1;
        self.epoch += 1;
        self.select(None);
        self.recompute();
        tracing::debug!("Trace replaced with {} entries", self.trace.len());
    }

    /// Append one entry from a live source. Ignored while recording is paused.
    pub fn append_entry(&mut self, record: HarEntry) -> Option<EntryId> {
        if !self.recording {
            tracing::debug!("Recording paused, dropping {}", record.request.url);
            return None;
        }
        let entry = self.admit(record);
        let id = entry.id();
        self.trace.push(entry);
        self.generation += 1;
        self.recompute();
        Some(id)
    }

    /// Append a batch from a live source with a single view rebuild.
    /// Returns how many entries were kept; none are while recording is paused.
    pub fn append_entries(&mut self, records: Vec<HarEntry>) -> usize {
        if records.is_empty() {
            return 0;
        }
        if !self.recording {
            tracing::debug!("Recording paused, dropping {} entries", records.len());
            return 0;
        }
        let count = records.len();
        for record in records {
            let entry = self.admit(record);
            self.trace.push(entry);
        }
        self.generation += 1;
        self.recompute();
        count
    }

    /// Empty the trace, the view and the selection
    pub fn clear(&mut self) {
        self.trace.clear();
        self.view.clear();
        self.generation += 1;
        self.epoch += 1;
        self.revision += 1;
        self.refresh_stats();
        self.select(None);
    }

    fn admit(&mut self, record: HarEntry) -> Arc<Entry> {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        Arc::new(Entry::new(id, record))
    }

    // ------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------

    /// Start an import. Only the most recently started import can apply,
    /// and only if nothing replaced or cleared the trace in the meantime.
    pub fn begin_import(&mut self) -> ImportTicket {
        self.import_seq += 1;
        self.import_pending = true;
        ImportTicket {
            seq: self.import_seq,
            epoch: self.epoch,
        }
    }

    /// Complete an import with parsed records
    pub fn finish_import(&mut self, ticket: ImportTicket, records: Vec<HarEntry>) -> ImportOutcome {
        if !self.is_current(ticket) {
            tracing::debug!("Discarding stale import #{}", ticket.seq);
            self.settle(ticket);
            return ImportOutcome::Stale;
        }
        let count = records.len();
        self.set_entries(records);
        self.import_pending = false;
        tracing::info!("Imported {} entries", count);
        ImportOutcome::Applied(count)
    }

    /// Complete an import that failed. Returns whether the failure still
    /// matters, i.e. whether it should be shown to the user.
    pub fn fail_import(&mut self, ticket: ImportTicket) -> bool {
        let current = self.is_current(ticket);
        self.settle(ticket);
        current
    }

    /// Whether the latest started import has not finished yet
    pub fn import_pending(&self) -> bool {
        self.import_pending
    }

    fn is_current(&self, ticket: ImportTicket) -> bool {
        ticket.seq == self.import_seq && ticket.epoch == self.epoch
    }

    fn settle(&mut self, ticket: ImportTicket) {
        if ticket.seq == self.import_seq {
            self.import_pending = false;
        }
    }

    // ------------------------------------------------------------------
    // Criteria
    // ------------------------------------------------------------------

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.filter.text = text.into();
        self.recompute();
    }

    pub fn toggle_category(&mut self, filter_type: FilterType) {
        self.filter.types.toggle(filter_type);
        self.recompute();
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.filter.invert = invert;
        self.recompute();
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort = SortCriteria::new(key, direction);
        self.recompute();
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn sort(&self) -> SortCriteria {
        self.sort
    }

    fn recompute(&mut self) {
        self.view = derive_view(&self.trace, &self.filter, &self.sort);
        self.revision += 1;
        self.refresh_stats();
        tracing::debug!(
            "View rebuilt: {} of {} entries (revision {})",
            self.view.len(),
            self.trace.len(),
            self.revision
        );
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn toggle_recording(&mut self) {
        self.recording = !self.recording;
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select an entry (opening the detail pane) or clear the selection
    /// (closing it). Ids that are not in the trace clear the selection.
    pub fn select(&mut self, id: Option<EntryId>) {
        let selected = id.filter(|id| self.entry(*id).is_some());
        self.selected = selected;
        self.detail_open = self.selected.is_some();
    }

    /// Select the entry at a position in the view
    pub fn select_view_index(&mut self, index: usize) {
        let id = self.view_entry(index).map(|e| e.id());
        if id.is_some() {
            self.select(id);
        }
    }

    /// Move the selection one row down the view, stopping at the end.
    /// Without a selection in the view, selects the first row.
    pub fn select_next(&mut self) {
        match self.selected_view_index() {
            Some(index) if index + 1 < self.view.len() => self.select_view_index(index + 1),
            Some(_) => {}
            None => self.select_view_index(0),
        }
    }

    /// Move the selection one row up the view, stopping at the top
    pub fn select_previous(&mut self) {
        if let Some(index) = self.selected_view_index() {
            if index > 0 {
                self.select_view_index(index - 1);
            }
        }
    }

    pub fn selected(&self) -> Option<EntryId> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Arc<Entry>> {
        self.selected.and_then(|id| self.entry(id))
    }

    /// Position of the selection in the view, if it is visible there
    pub fn selected_view_index(&self) -> Option<usize> {
        self.selected.and_then(|id| self.view_index_of(id))
    }

    pub fn detail_open(&self) -> bool {
        self.detail_open
    }

    /// Explicitly show or hide the detail pane. Cannot open it without a
    /// selection.
    pub fn toggle_detail(&mut self) {
        self.detail_open = !self.detail_open && self.selected.is_some();
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn trace(&self) -> &[Arc<Entry>] {
        &self.trace
    }

    pub fn entry(&self, id: EntryId) -> Option<&Arc<Entry>> {
        self.trace
            .binary_search_by_key(&id, |e| e.id())
            .ok()
            .map(|i| &self.trace[i])
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn view_entry(&self, index: usize) -> Option<&Arc<Entry>> {
        self.view.get(index).map(|&i| &self.trace[i])
    }

    /// Entries of the view in display order
    pub fn view(&self) -> impl ExactSizeIterator<Item = &Arc<Entry>> + '_ {
        self.view.iter().map(|&i| &self.trace[i])
    }

    pub fn view_index_of(&self, id: EntryId) -> Option<usize> {
        self.view.iter().position(|&i| self.trace[i].id() == id)
    }

    /// Changes every time the view is rebuilt
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Changes every time the trace contents change
    pub fn trace_generation(&self) -> u64 {
        self.generation
    }

    /// Summary numbers for the status bar. Totals are only recomputed when
    /// the trace changes; the filtered count follows the view.
    pub fn stats(&self) -> &TraceStats {
        &self.stats
    }

    /// How many times the trace totals were recomputed
    pub fn stats_computations(&self) -> u64 {
        self.stats_computations
    }

    fn refresh_stats(&mut self) {
        if self.stats_generation != self.generation {
            self.stats = TraceStats::compute(self.trace.iter().map(|e| e.as_ref()), 0);
            self.stats_generation = self.generation;
            self.stats_computations += 1;
        }
        self.stats.filtered_requests = self.view.len();
    }
}
