//! Sort criteria and the comparator used to order the view

use crate::entry::Entry;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Column the view is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    Name,
    Status,
    Method,
    Type,
    Size,
    Duration,
    #[default]
    StartTime,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Name,
        SortKey::Status,
        SortKey::Method,
        SortKey::Type,
        SortKey::Size,
        SortKey::Duration,
        SortKey::StartTime,
    ];

    /// Lenient parse: unknown names fall back to start time
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "status" => SortKey::Status,
            "method" => SortKey::Method,
            "type" | "mime" => SortKey::Type,
            "size" => SortKey::Size,
            "time" | "duration" => SortKey::Duration,
            "start" | "starttime" | "starteddatetime" | "waterfall" => SortKey::StartTime,
            other => {
                tracing::debug!("Unknown sort key {:?}, using start time", other);
                SortKey::StartTime
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Status => "Status",
            SortKey::Method => "Method",
            SortKey::Type => "Type",
            SortKey::Size => "Size",
            SortKey::Duration => "Time",
            SortKey::StartTime => "Waterfall",
        }
    }

    /// Next key in column order, wrapping around
    pub fn next(&self) -> Self {
        let pos = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    /// Compare two entries on this key, ascending
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            // Raw, case-sensitive string comparison
            SortKey::Name => a.sort_name().cmp(b.sort_name()),
            SortKey::Status => a.status().cmp(&b.status()),
            SortKey::Method => a.method().cmp(b.method()),
            SortKey::Type => a.mime_type().cmp(b.mime_type()),
            SortKey::Size => a.body_size().cmp(&b.body_size()),
            SortKey::Duration => a.duration_ms().total_cmp(&b.duration_ms()),
            SortKey::StartTime => a.started_ms().cmp(&b.started_ms()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortCriteria {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortCriteria {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Directional comparison. Equal entries stay equal in both directions.
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    /// Stable sort of trace indices; ties keep their incoming order
    pub fn sort_indices(&self, trace: &[Arc<Entry>], indices: &mut [usize]) {
        indices.sort_by(|&a, &b| self.compare(&trace[a], &trace[b]));
    }
}
