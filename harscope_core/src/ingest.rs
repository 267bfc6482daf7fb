//! HAR ingestion contract
//!
//! Bytes in, typed records out, all-or-nothing: a single malformed entry
//! rejects the whole document so a failed import never partially replaces
//! a good trace.

use crate::error::{ImportError, ParseError};
use crate::har::HarEntry;
use serde_json::Value;
use std::path::Path;

/// How a file reached the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportSource {
    /// Explicitly chosen path (import prompt or command line)
    Picker,
    /// Dropped onto the terminal; only `.har` files are accepted
    Drop,
}

impl ImportSource {
    /// Extension pre-check, run before any I/O
    pub fn check(&self, path: &Path) -> Result<(), ImportError> {
        match self {
            ImportSource::Picker => Ok(()),
            ImportSource::Drop => {
                let is_har = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("har"));
                if is_har {
                    Ok(())
                } else {
                    Err(ImportError::UnsupportedFile(path.to_path_buf()))
                }
            }
        }
    }
}

/// Parse a HAR document into its entry records
pub fn parse_har(bytes: &[u8]) -> Result<Vec<HarEntry>, ParseError> {
    let mut document: Value = serde_json::from_slice(bytes).map_err(ParseError::Syntax)?;

    let log = document
        .get_mut("log")
        .filter(|log| log.is_object())
        .ok_or_else(|| ParseError::Shape("missing log".to_string()))?;

    let entries = match log.get_mut("entries") {
        Some(Value::Array(entries)) => std::mem::take(entries),
        Some(_) => return Err(ParseError::Shape("log.entries is not an array".to_string())),
        None => return Err(ParseError::Shape("missing log or entries".to_string())),
    };

    let parsed = entries
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            serde_json::from_value::<HarEntry>(raw).map_err(|e| ParseError::entry(index, e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!("Parsed {} HAR entries", parsed.len());
    Ok(parsed)
}

/// Parse a HAR document delivered from `path`, honoring the source's pre-check
pub fn import_bytes(source: ImportSource, path: &Path, bytes: &[u8]) -> Result<Vec<HarEntry>, ImportError> {
    source.check(path)?;
    Ok(parse_har(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn entry(url: &str) -> Value {
        json!({
            "startedDateTime": "2024-01-01T00:00:00.000Z",
            "time": 12.0,
            "request": { "method": "GET", "url": url, "headers": [] },
            "response": {
                "status": 200,
                "statusText": "OK",
                "headers": [],
                "content": { "size": 10, "mimeType": "text/html" }
            },
            "timings": { "send": 1, "wait": 10, "receive": 1 }
        })
    }

    #[test]
    fn test_parse_valid_document() {
        let doc = json!({ "log": { "version": "1.2", "entries": [entry("https://a.test/"), entry("https://b.test/")] } });
        let entries = parse_har(doc.to_string().as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].request.url, "https://b.test/");
    }

    #[test]
    fn test_empty_entries_is_valid() {
        let entries = parse_har(br#"{"log":{"entries":[]}}"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_syntax_error_is_distinguished() {
        let err = parse_har(b"{\"log\": ").unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
        assert!(err.to_string().starts_with("Failed to parse HAR file"));
    }

    #[test]
    fn test_shape_errors() {
        let err = parse_har(br#"{"entries": []}"#).unwrap_err();
        assert!(matches!(err, ParseError::Shape(_)));

        let err = parse_har(br#"{"log": {"entries": {}}}"#).unwrap_err();
        assert!(matches!(err, ParseError::Shape(_)));

        let err = parse_har(br#"[1, 2, 3]"#).unwrap_err();
        assert!(matches!(err, ParseError::Shape(_)));
    }

    #[test]
    fn test_one_bad_entry_rejects_everything() {
        let mut bad = entry("https://c.test/");
        bad.as_object_mut().unwrap().remove("timings");
        let doc = json!({ "log": { "entries": [entry("https://a.test/"), bad] } });

        let err = parse_har(doc.to_string().as_bytes()).unwrap_err();
        match err {
            ParseError::Shape(msg) => assert!(msg.starts_with("entry 1:"), "{}", msg),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_timestamp_is_shape_error() {
        let mut bad = entry("https://a.test/");
        bad["startedDateTime"] = json!("yesterday");
        let doc = json!({ "log": { "entries": [bad] } });
        assert!(matches!(
            parse_har(doc.to_string().as_bytes()),
            Err(ParseError::Shape(_))
        ));
    }

    #[test]
    fn test_drop_requires_har_extension() {
        let doc = br#"{"log":{"entries":[]}}"#;

        let err = import_bytes(ImportSource::Drop, &PathBuf::from("trace.json"), doc).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFile(_)));

        assert!(import_bytes(ImportSource::Drop, &PathBuf::from("trace.HAR"), doc).is_ok());
        assert!(import_bytes(ImportSource::Picker, &PathBuf::from("trace.json"), doc).is_ok());
    }
}
