//! Virtualized row window
//!
//! Maps a view length, a scroll offset and a viewport height to the small
//! contiguous range of rows that actually has to be built. Work is
//! proportional to the rows materialized, never to the length of the view.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Extra rows built above and below the visible range
pub const DEFAULT_OVERSCAN: usize = 5;

/// Row size preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSize {
    #[default]
    Compact,
    Big,
}

impl RowSize {
    /// Row height in terminal lines
    pub fn height(&self) -> u32 {
        match self {
            RowSize::Compact => 1,
            RowSize::Big => 2,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            RowSize::Compact => RowSize::Big,
            RowSize::Big => RowSize::Compact,
        }
    }
}

/// One materialized row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualRow {
    /// Position in the view
    pub index: usize,
    /// Absolute offset of the row's top edge in the scrolled content
    pub start: u64,
    pub size: u32,
    /// Offset of the row's top edge relative to the viewport top. Negative
    /// for rows (partly) above the viewport.
    pub translate: i64,
}

/// Rows to build for the current scroll position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWindow {
    /// Materialized rows, overscan included
    pub range: Range<usize>,
    /// Rows that intersect the viewport
    pub visible: Range<usize>,
    pub row_height: u32,
    pub scroll_offset: u64,
    pub total_height: u64,
}

impl RowWindow {
    pub fn rows(&self) -> impl Iterator<Item = VirtualRow> + '_ {
        self.range.clone().map(move |index| {
            let start = index as u64 * self.row_height as u64;
            VirtualRow {
                index,
                start,
                size: self.row_height,
                translate: start as i64 - self.scroll_offset as i64,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Result of a window computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    /// The view is empty; render a "no results" placeholder
    Empty,
    Rows(RowWindow),
}

impl Window {
    pub fn rows(&self) -> Option<&RowWindow> {
        match self {
            Window::Empty => None,
            Window::Rows(rows) => Some(rows),
        }
    }
}

/// Upper bound on rows materialized for a viewport, independent of N
pub fn max_materialized(viewport_height: u32, row_height: u32, overscan: usize) -> usize {
    let row_height = row_height.max(1);
    viewport_height.div_ceil(row_height) as usize + 1 + 2 * overscan
}

/// Largest valid scroll offset for `len` rows
pub fn max_scroll(len: usize, viewport_height: u32, row_height: u32) -> u64 {
    let total = len as u64 * row_height.max(1) as u64;
    total.saturating_sub(viewport_height as u64)
}

/// Compute the materialized window. The scroll offset is clamped to the
/// scrollable range.
pub fn compute_window(
    len: usize,
    scroll_offset: u64,
    viewport_height: u32,
    row_height: u32,
    overscan: usize,
) -> Window {
    if len == 0 {
        return Window::Empty;
    }

    let row_height = row_height.max(1);
    let rh = row_height as u64;
    let scroll_offset = scroll_offset.min(max_scroll(len, viewport_height, row_height));

    let first = (scroll_offset / rh) as usize;
    let visible_end = ((scroll_offset + viewport_height as u64).div_ceil(rh) as usize).min(len);
    let visible_end = visible_end.max(first);

    Window::Rows(RowWindow {
        range: first.saturating_sub(overscan)..(visible_end + overscan).min(len),
        visible: first..visible_end,
        row_height,
        scroll_offset,
        total_height: len as u64 * rh,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowKey {
    len: usize,
    scroll_offset: u64,
    viewport_height: u32,
    row_height: u32,
}

/// Stateful window: owns the scroll position and caches the last result
#[derive(Debug, Clone)]
pub struct Virtualizer {
    row_size: RowSize,
    overscan: usize,
    viewport_height: u32,
    scroll_offset: u64,
    cached: Option<(WindowKey, Window)>,
    measurements: u64,
}

impl Virtualizer {
    pub fn new(row_size: RowSize) -> Self {
        Self {
            row_size,
            overscan: DEFAULT_OVERSCAN,
            viewport_height: 0,
            scroll_offset: 0,
            cached: None,
            measurements: 0,
        }
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn row_size(&self) -> RowSize {
        self.row_size
    }

    pub fn row_height(&self) -> u32 {
        self.row_size.height()
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// How many windows have been computed (cache misses)
    pub fn measurements(&self) -> u64 {
        self.measurements
    }

    /// Switch row size. Forces a full re-measurement and keeps the first
    /// visible row at the top.
    pub fn set_row_size(&mut self, row_size: RowSize) {
        if row_size == self.row_size {
            return;
        }
        let first = self.scroll_offset / self.row_height() as u64;
        self.row_size = row_size;
        self.scroll_offset = first * self.row_height() as u64;
        self.cached = None;
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
    }

    pub fn scroll_to(&mut self, offset: u64, len: usize) {
        self.scroll_offset = offset.min(max_scroll(len, self.viewport_height, self.row_height()));
    }

    pub fn scroll_by(&mut self, delta: i64, len: usize) {
        let target = if delta < 0 {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll_offset.saturating_add(delta as u64)
        };
        self.scroll_to(target, len);
    }

    /// Scroll the least amount needed to show row `index` completely
    pub fn scroll_to_index(&mut self, index: usize, len: usize) {
        let rh = self.row_height() as u64;
        let top = index as u64 * rh;
        let bottom = top + rh;
        let viewport = self.viewport_height as u64;

        if top < self.scroll_offset {
            self.scroll_to(top, len);
        } else if bottom > self.scroll_offset + viewport {
            self.scroll_to(bottom.saturating_sub(viewport), len);
        }
    }

    /// View index under a viewport-relative offset, if there is a row there
    pub fn index_at(&self, viewport_offset: u32, len: usize) -> Option<usize> {
        if viewport_offset >= self.viewport_height {
            return None;
        }
        let absolute = self.scroll_offset + viewport_offset as u64;
        let index = (absolute / self.row_height() as u64) as usize;
        (index < len).then_some(index)
    }

    /// Window for a view of `len` rows. Returns the cached window when
    /// nothing changed since the last call.
    pub fn window(&mut self, len: usize) -> &Window {
        self.scroll_offset = self
            .scroll_offset
            .min(max_scroll(len, self.viewport_height, self.row_height()));
        let key = WindowKey {
            len,
            scroll_offset: self.scroll_offset,
            viewport_height: self.viewport_height,
            row_height: self.row_height(),
        };

        let hit = matches!(&self.cached, Some((cached, _)) if *cached == key);
        if !hit {
            let window = compute_window(
                len,
                key.scroll_offset,
                key.viewport_height,
                key.row_height,
                self.overscan,
            );
            self.measurements += 1;
            self.cached = Some((key, window));
        }

        match &self.cached {
            Some((_, window)) => window,
            None => &Window::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(window: Window) -> RowWindow {
        match window {
            Window::Rows(rows) => rows,
            Window::Empty => panic!("expected rows"),
        }
    }

    #[test]
    fn test_empty_view_is_placeholder() {
        assert_eq!(compute_window(0, 0, 100, 28, 5), Window::Empty);
    }

    #[test]
    fn test_window_at_top() {
        let w = rows(compute_window(1000, 0, 280, 28, 5));
        assert_eq!(w.visible, 0..10);
        assert_eq!(w.range, 0..15);
        assert_eq!(w.total_height, 28_000);
    }

    #[test]
    fn test_window_mid_scroll_unaligned() {
        // 14px into row 100
        let w = rows(compute_window(1000, 100 * 28 + 14, 280, 28, 5));
        assert_eq!(w.visible, 100..111);
        assert_eq!(w.range, 95..116);

        let first = w.rows().find(|r| r.index == 100).unwrap();
        assert_eq!(first.translate, -14);
        assert_eq!(first.start, 2800);
    }

    #[test]
    fn test_scroll_is_clamped_at_bottom() {
        let w = rows(compute_window(20, 10_000, 100, 10, 2));
        assert_eq!(w.scroll_offset, 100);
        assert_eq!(w.visible, 10..20);
        assert_eq!(w.range, 8..20);
    }

    #[test]
    fn test_short_view_fits_in_viewport() {
        let w = rows(compute_window(3, 50, 100, 10, 5));
        assert_eq!(w.scroll_offset, 0);
        assert_eq!(w.range, 0..3);
    }

    #[test]
    fn test_window_covers_viewport_and_is_bounded() {
        let (viewport, rh, overscan) = (97u32, 7u32, 3usize);
        let bound = max_materialized(viewport, rh, overscan);
        for len in [1usize, 5, 14, 15, 100, 10_000] {
            for scroll in (0..(len as u64 * rh as u64 + 50)).step_by(5) {
                let w = rows(compute_window(len, scroll, viewport, rh, overscan));
                assert!(w.len() <= bound, "len={len} scroll={scroll}");

                let top = w.scroll_offset;
                let bottom = top + viewport as u64;
                let near = w.visible.start.saturating_sub(2)..(w.visible.end + 2).min(len);
                for index in near {
                    let start = index as u64 * rh as u64;
                    let end = start + rh as u64;
                    if start < bottom && end > top {
                        assert!(w.visible.contains(&index), "len={len} scroll={scroll} index={index}");
                    }
                }
                assert_eq!(w.range.start, w.visible.start.saturating_sub(overscan));
                assert_eq!(w.range.end, (w.visible.end + overscan).min(len));
            }
        }
    }

    #[test]
    fn test_virtualizer_caches_unchanged_input() {
        let mut v = Virtualizer::new(RowSize::Compact);
        v.set_viewport_height(20);
        let first = v.window(500).clone();
        let second = v.window(500).clone();
        assert_eq!(first, second);
        assert_eq!(v.measurements(), 1);

        v.scroll_by(3, 500);
        v.window(500);
        assert_eq!(v.measurements(), 2);
    }

    #[test]
    fn test_row_size_switch_remeasures_and_keeps_anchor() {
        let mut v = Virtualizer::new(RowSize::Compact);
        v.set_viewport_height(20);
        v.scroll_to(40, 500);
        v.window(500);

        v.set_row_size(RowSize::Big);
        assert_eq!(v.scroll_offset(), 80);
        let w = v.window(500).rows().unwrap().clone();
        assert_eq!(w.visible.start, 40);
        assert_eq!(w.row_height, 2);
        assert_eq!(v.measurements(), 2);
    }

    #[test]
    fn test_scroll_to_index() {
        let mut v = Virtualizer::new(RowSize::Big);
        v.set_viewport_height(10);

        v.scroll_to_index(20, 100);
        assert_eq!(v.scroll_offset(), 32);

        v.scroll_to_index(18, 100);
        assert_eq!(v.scroll_offset(), 32);

        v.scroll_to_index(3, 100);
        assert_eq!(v.scroll_offset(), 6);
    }

    #[test]
    fn test_index_at() {
        let mut v = Virtualizer::new(RowSize::Big);
        v.set_viewport_height(10);
        v.scroll_to(4, 100);

        assert_eq!(v.index_at(0, 100), Some(2));
        assert_eq!(v.index_at(3, 100), Some(3));
        assert_eq!(v.index_at(10, 100), None);
        assert_eq!(v.index_at(9, 3), None);
    }
}
