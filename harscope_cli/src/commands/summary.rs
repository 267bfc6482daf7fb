//! Print a trace summary without the TUI

use super::Presets;
use crate::import::read_har;
use anyhow::{Context, Result};
use console::style;
use harscope_core::stats::{format_bytes, format_duration};
use harscope_core::{Entry, ImportSource, TraceStore};
use std::path::PathBuf;

/// Options for the summary command
pub struct SummaryOptions {
    pub file: PathBuf,
    pub presets: Presets,
    /// Print at most this many rows
    pub limit: Option<usize>,
}

/// Load a HAR file and print its filtered, sorted view
pub async fn run(opts: SummaryOptions) -> Result<()> {
    use cliclack::{intro, outro};

    intro(style(" harscope summary ").on_cyan().black().to_string())?;

    let entries = read_har(ImportSource::Picker, &opts.file)
        .await
        .with_context(|| format!("Failed to import {}", opts.file.display()))?;

    let mut store = TraceStore::new();
    opts.presets.apply(&mut store);
    store.set_entries(entries);

    if store.view_len() == 0 {
        cliclack::log::warning("No requests match the current filter")?;
    } else {
        println!();
        println!(
            "{:<6} {:<7} {:<12} {:>10} {:>10}  {}",
            "STATUS", "METHOD", "TYPE", "SIZE", "TIME", "NAME"
        );
        println!("{}", "-".repeat(80));

        let limit = opts.limit.unwrap_or(usize::MAX);
        for entry in store.view().take(limit) {
            println!("{}", format_row(entry));
        }
        if store.view_len() > limit {
            println!(
                "{}",
                style(format!("... {} more", store.view_len() - limit)).dim()
            );
        }
        println!();
    }

    let stats = store.stats();
    cliclack::log::info(format!(
        "{} {} / {} requests  {} {} transferred  {} {} resources  {} {}",
        style("Requests:").dim(),
        style(stats.filtered_requests).cyan(),
        stats.total_requests,
        style("│").dim(),
        style(format_bytes(stats.transferred_bytes)).green(),
        style("│").dim(),
        format_bytes(stats.resource_bytes),
        style("│ Finish:").dim(),
        style(format_duration(stats.finish_ms)).yellow(),
    ))?;

    outro(format!("{}", opts.file.display()))?;
    Ok(())
}

/// One line of the summary table
fn format_row(entry: &Entry) -> String {
    format!(
        "{:<6} {:<7} {:<12} {:>10} {:>10}  {}",
        entry.status(),
        entry.method(),
        entry.resource_type().as_str(),
        format_bytes(entry.body_size().max(0) as u64),
        format_duration(entry.duration_ms()),
        truncate(entry.display_name(), 60),
    )
}

/// Truncate a string with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harscope_core::ingest::parse_har;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-name.js", 10), "a-very-...");
    }

    #[test]
    fn test_format_row() {
        let archive = r#"{"log": {"entries": [{
            "startedDateTime": "2024-01-01T00:00:00Z",
            "time": 42,
            "request": {"method": "GET", "url": "https://a.test/app.js", "headers": []},
            "response": {
                "status": 200,
                "headers": [],
                "bodySize": 2048,
                "content": {"size": 2048, "mimeType": "application/javascript"}
            },
            "timings": {}
        }]}}"#;
        let mut store = TraceStore::new();
        store.set_entries(parse_har(archive.as_bytes()).unwrap());

        let row = format_row(store.view_entry(0).unwrap());
        assert!(row.starts_with("200    GET "));
        assert!(row.contains("2 KB"));
        assert!(row.contains("42 ms"));
        assert!(row.ends_with("app.js"));
    }
}
