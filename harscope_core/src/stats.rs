//! Trace totals for the status bar, plus the byte/duration formatters

use crate::entry::Entry;
use serde::Serialize;

/// Totals over the whole trace, with the filtered count alongside
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraceStats {
    pub total_requests: usize,
    pub filtered_requests: usize,
    /// Bytes on the wire (transfer size, falling back to body size)
    pub transferred_bytes: u64,
    /// Decoded resource bytes (body size)
    pub resource_bytes: u64,
    /// Time from the first start to the last finish
    pub finish_ms: f64,
}

impl TraceStats {
    pub fn compute<'a>(trace: impl IntoIterator<Item = &'a Entry>, filtered_requests: usize) -> Self {
        let mut stats = TraceStats {
            filtered_requests,
            ..Default::default()
        };
        let mut first_start: Option<f64> = None;
        let mut last_end: Option<f64> = None;

        for entry in trace {
            let response = &entry.record().response;
            let body = response.body_size.max(0) as u64;
            let transfer = response
                .transfer_size
                .filter(|size| *size > 0)
                .map(|size| size as u64)
                .unwrap_or(body);

            stats.total_requests += 1;
            stats.transferred_bytes += transfer;
            stats.resource_bytes += body;

            let start = entry.started_ms() as f64;
            let end = start + entry.duration_ms().max(0.0);
            first_start = Some(first_start.map_or(start, |s| s.min(start)));
            last_end = Some(last_end.map_or(end, |e| e.max(end)));
        }

        if let (Some(start), Some(end)) = (first_start, last_end) {
            stats.finish_ms = end - start;
        }
        stats
    }
}

/// Human-readable byte count (1024-based)
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        let text = format!("{:.2}", value);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        format!("{} {}", text, UNITS[unit])
    }
}

/// Human-readable duration: whole milliseconds below a second
pub fn format_duration(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{} ms", ms.round() as i64)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(12.4), "12 ms");
        assert_eq!(format_duration(999.6), "1000 ms");
        assert_eq!(format_duration(1500.0), "1.50 s");
    }
}
