//! Background HAR file imports
//!
//! Reading and parsing happen off the event loop; the result comes back as a
//! [`TuiEvent::ImportFinished`] carrying the ticket the store handed out, so
//! the store alone decides whether it still applies.

use crate::tui::TuiEvent;
use harscope_core::ingest::import_bytes;
use harscope_core::{HarEntry, ImportError, ImportSource, ImportTicket};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Read and parse `path` in the background
pub fn spawn_import(
    ticket: ImportTicket,
    source: ImportSource,
    path: PathBuf,
    events: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = read_har(source, &path).await;
        let event = TuiEvent::ImportFinished {
            ticket,
            path,
            result,
        };
        if events.send(event).await.is_err() {
            tracing::debug!("Viewer closed before import finished");
        }
    })
}

/// Read and parse a HAR file
pub async fn read_har(source: ImportSource, path: &Path) -> Result<Vec<HarEntry>, ImportError> {
    source.check(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|e| ImportError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
    import_bytes(source, path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harscope_core::TraceStore;
    use tempfile::TempDir;

    const ARCHIVE: &str = r#"{"log": {"entries": [{
        "startedDateTime": "2024-01-01T00:00:00Z",
        "time": 5,
        "request": {"method": "GET", "url": "https://a.test/", "headers": []},
        "response": {"status": 200, "headers": [], "content": {"mimeType": "text/html"}},
        "timings": {}
    }]}}"#;

    #[tokio::test]
    async fn test_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.har");
        std::fs::write(&path, ARCHIVE).unwrap();

        let mut store = TraceStore::new();
        let ticket = store.begin_import();
        let (tx, mut rx) = mpsc::channel(4);
        spawn_import(ticket, ImportSource::Drop, path.clone(), tx).await.unwrap();

        match rx.recv().await {
            Some(TuiEvent::ImportFinished {
                ticket: got,
                path: got_path,
                result,
            }) => {
                assert_eq!(got, ticket);
                assert_eq!(got_path, path);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let result = read_har(ImportSource::Picker, &dir.path().join("nope.har")).await;
        assert!(matches!(result, Err(ImportError::Read { .. })));
    }

    #[tokio::test]
    async fn test_dropped_non_har_is_rejected_before_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        let result = read_har(ImportSource::Drop, &path).await;
        assert!(matches!(result, Err(ImportError::UnsupportedFile(_))));
    }

    #[tokio::test]
    async fn test_picker_accepts_any_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("capture.json");
        std::fs::write(&path, ARCHIVE).unwrap();
        assert_eq!(read_har(ImportSource::Picker, &path).await.unwrap().len(), 1);
    }
}
