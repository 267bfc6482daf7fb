//! Timeline overview projection
//!
//! The axis spans the *unfiltered* trace so it stays put while filters
//! change; only the set of bars drawn on it follows the view. Projection and
//! hit testing are pure, so the widget that paints the bars and the mouse
//! handler that clicks them agree on every rectangle.

use crate::entry::{Entry, EntryId, ResourceType};
use crate::store::TraceStore;
use std::sync::Arc;

/// Axis span used when the trace has no measurable extent
pub const MIN_SPAN_MS: f64 = 1000.0;

/// Vertical lanes bars are spread over
pub const SLOTS: usize = 3;

/// Time range covered by the overview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    /// Earliest start, epoch milliseconds
    pub start_ms: i64,
    pub span_ms: f64,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            start_ms: 0,
            span_ms: MIN_SPAN_MS,
        }
    }
}

impl TimeAxis {
    /// `[min start, max(start + duration)]` over `entries`
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Self {
        let mut bounds: Option<(i64, f64)> = None;
        for entry in entries {
            let start = entry.started_ms();
            let end = start as f64 + entry.duration_ms().max(0.0);
            bounds = Some(match bounds {
                None => (start, end),
                Some((min, max)) => (min.min(start), max.max(end)),
            });
        }

        match bounds {
            None => TimeAxis::default(),
            Some((start_ms, end)) => {
                let span = end - start_ms as f64;
                TimeAxis {
                    start_ms,
                    span_ms: if span > 0.0 { span } else { MIN_SPAN_MS },
                }
            }
        }
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms as f64 + self.span_ms
    }

    /// Horizontal position of an absolute timestamp on a `width`-wide axis
    pub fn to_x(&self, ms: f64, width: f64) -> f64 {
        (ms - self.start_ms as f64) / self.span_ms * width
    }

    /// `count` evenly spaced tick offsets from the axis start, both ends
    /// included
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![0.0],
            _ => (0..count)
                .map(|i| self.span_ms * i as f64 / (count - 1) as f64)
                .collect(),
        }
    }
}

/// Drawing surface the bars are projected onto
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    pub width: f64,
    pub height: f64,
    /// Nominal bar height; each drawn bar is half of it
    pub bar_height: f64,
    pub slot_gap: f64,
}

impl TimelineGeometry {
    /// Pixel canvas of the given width
    pub fn canvas(width: f64) -> Self {
        Self {
            width,
            height: 80.0,
            bar_height: 16.0,
            slot_gap: 2.0,
        }
    }

    /// Terminal cell grid: one bar per line, one line per slot
    pub fn cells(cols: u16, rows: u16) -> Self {
        Self {
            width: cols as f64,
            height: rows as f64,
            bar_height: 2.0,
            slot_gap: 0.0,
        }
    }

    fn slot_y(&self, slot: usize) -> f64 {
        (self.height - self.bar_height) / 2.0 + slot as f64 * (self.bar_height / 2.0 + self.slot_gap)
    }
}

/// One projected entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub entry: EntryId,
    pub view_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub slot: usize,
    pub resource_type: ResourceType,
}

impl Bar {
    /// Closed-rectangle containment
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Project the view onto `axis`, one bar per entry, in view order
pub fn project<'a>(
    view: impl IntoIterator<Item = &'a Arc<Entry>>,
    axis: &TimeAxis,
    geometry: &TimelineGeometry,
) -> Vec<Bar> {
    view.into_iter()
        .enumerate()
        .map(|(view_index, entry)| {
            let slot = view_index % SLOTS;
            Bar {
                entry: entry.id(),
                view_index,
                x: axis.to_x(entry.started_ms() as f64, geometry.width),
                y: geometry.slot_y(slot),
                width: (entry.duration_ms() / axis.span_ms * geometry.width).max(1.0),
                height: geometry.bar_height / 2.0,
                slot,
                resource_type: entry.resource_type(),
            }
        })
        .collect()
}

/// Last bar (in view order) containing the point. Later bars are drawn on
/// top, so they win.
pub fn hit_test(bars: &[Bar], x: f64, y: f64) -> Option<&Bar> {
    bars.iter().rev().find(|bar| bar.contains(x, y))
}

/// Cached projection kept in step with a [`TraceStore`]
#[derive(Debug, Default)]
pub struct Timeline {
    axis: TimeAxis,
    axis_generation: Option<u64>,
    bars: Vec<Bar>,
    bars_key: Option<(u64, u64, TimelineGeometry)>,
    projections: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the cache up to date and return the bars. The axis is only
    /// recomputed when the trace changed; bars only when the view, the
    /// axis or the geometry changed.
    pub fn sync(&mut self, store: &TraceStore, geometry: TimelineGeometry) -> &[Bar] {
        let generation = store.trace_generation();
        if self.axis_generation != Some(generation) {
            self.axis = TimeAxis::from_entries(store.trace().iter().map(|e| e.as_ref()));
            self.axis_generation = Some(generation);
        }

        let key = (generation, store.revision(), geometry);
        if self.bars_key != Some(key) {
            self.bars = project(store.view(), &self.axis, &geometry);
            self.bars_key = Some(key);
            self.projections += 1;
        }
        &self.bars
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// How many times bars were projected (cache misses)
    pub fn projections(&self) -> u64 {
        self.projections
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<&Bar> {
        hit_test(&self.bars, x, y)
    }

    /// Select whatever bar is under the point. Returns the selected id.
    pub fn select_at(&self, store: &mut TraceStore, x: f64, y: f64) -> Option<EntryId> {
        let id = self.hit_test(x, y)?.entry;
        store.select(Some(id));
        Some(id)
    }
}
