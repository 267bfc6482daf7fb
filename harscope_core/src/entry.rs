//! Stored trace entries and their derived resource type

use crate::har::HarEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Synthetic identifier assigned when an entry enters a store.
///
/// Ids only ever increase within one store, so the trace (which is kept in
/// arrival order) is sorted by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse resource classification derived from MIME type and URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Stylesheet,
    Script,
    Xhr,
    Image,
    Media,
    Font,
    WebSocket,
    Manifest,
    Wasm,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".ico", ".avif"];
const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".webm", ".mp3", ".ogg", ".wav", ".m4a"];
const FONT_EXTENSIONS: &[&str] = &[".woff", ".woff2", ".ttf", ".otf", ".eot"];

impl ResourceType {
    /// Classify a response.
    ///
    /// A `ws` scheme wins over everything. Otherwise a decisive MIME type
    /// decides; URL heuristics only apply when the MIME type is missing or
    /// generic (`text/plain`, `application/octet-stream`, ...).
    pub fn classify(mime_type: &str, url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.starts_with("ws") {
            return ResourceType::WebSocket;
        }
        Self::from_mime(&mime_type.to_ascii_lowercase()).unwrap_or_else(|| Self::from_url(&url))
    }

    /// Manifest and wasm are tested before JSON so that
    /// `application/manifest+json` is not reported as XHR.
    fn from_mime(mime: &str) -> Option<Self> {
        let kind = if mime.contains("manifest") {
            ResourceType::Manifest
        } else if mime.contains("wasm") {
            ResourceType::Wasm
        } else if mime.contains("html") {
            ResourceType::Document
        } else if mime.contains("css") {
            ResourceType::Stylesheet
        } else if mime.contains("javascript") || mime.contains("ecmascript") {
            ResourceType::Script
        } else if mime.contains("json") {
            ResourceType::Xhr
        } else if mime.starts_with("image/") {
            ResourceType::Image
        } else if mime.starts_with("audio/") || mime.starts_with("video/") {
            ResourceType::Media
        } else if mime.contains("font") || mime.contains("woff") || mime.contains("ttf") {
            ResourceType::Font
        } else {
            return None;
        };
        Some(kind)
    }

    fn from_url(url: &str) -> Self {
        let path = url_path(url);
        let ends_with_any = |exts: &[&str]| exts.iter().any(|ext| path.ends_with(ext));

        if path.ends_with(".html") || path.ends_with(".htm") {
            ResourceType::Document
        } else if path.ends_with(".css") {
            ResourceType::Stylesheet
        } else if path.ends_with(".wasm") {
            ResourceType::Wasm
        } else if path.ends_with(".js") || path.ends_with(".mjs") {
            ResourceType::Script
        } else if ends_with_any(IMAGE_EXTENSIONS) {
            ResourceType::Image
        } else if ends_with_any(MEDIA_EXTENSIONS) {
            ResourceType::Media
        } else if ends_with_any(FONT_EXTENSIONS) {
            ResourceType::Font
        } else if path.contains("manifest") {
            ResourceType::Manifest
        } else if path.contains("/api/") {
            ResourceType::Xhr
        } else {
            ResourceType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Document => "document",
            ResourceType::Stylesheet => "stylesheet",
            ResourceType::Script => "script",
            ResourceType::Xhr => "xhr",
            ResourceType::Image => "image",
            ResourceType::Media => "media",
            ResourceType::Font => "font",
            ResourceType::WebSocket => "websocket",
            ResourceType::Manifest => "manifest",
            ResourceType::Wasm => "wasm",
            ResourceType::Other => "other",
        }
    }
}

/// Path part of a URL, without scheme, host, query or fragment
fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let path = without_scheme
        .find('/')
        .map(|i| &without_scheme[i..])
        .unwrap_or("");
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Host part of a URL, or the whole string if it does not look like one
pub fn url_host(url: &str) -> &str {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let end = without_scheme
        .find(['/', '?', '#'])
        .unwrap_or(without_scheme.len());
    &without_scheme[..end]
}

/// An entry admitted to a trace store. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: EntryId,
    started_ms: i64,
    resource_type: ResourceType,
    record: HarEntry,
}

impl Entry {
    pub(crate) fn new(id: EntryId, record: HarEntry) -> Self {
        let resource_type =
            ResourceType::classify(&record.response.content.mime_type, &record.request.url);
        Self {
            id,
            started_ms: record.started_date_time.timestamp_millis(),
            resource_type,
            record,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// The archive record this entry was built from
    pub fn record(&self) -> &HarEntry {
        &self.record
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.record.started_date_time
    }

    /// Start time in milliseconds since the Unix epoch
    pub fn started_ms(&self) -> i64 {
        self.started_ms
    }

    pub fn duration_ms(&self) -> f64 {
        self.record.time
    }

    pub fn url(&self) -> &str {
        &self.record.request.url
    }

    pub fn method(&self) -> &str {
        &self.record.request.method
    }

    pub fn status(&self) -> u16 {
        self.record.response.status
    }

    pub fn mime_type(&self) -> &str {
        &self.record.response.content.mime_type
    }

    pub fn body_size(&self) -> i64 {
        self.record.response.body_size
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Everything after the last `/` of the URL, used as the sort name
    pub fn sort_name(&self) -> &str {
        self.url().rsplit('/').next().unwrap_or_default()
    }

    /// File name for display: last path segment, falling back to the host
    pub fn display_name(&self) -> &str {
        let path = url_path(self.url());
        match path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => url_host(self.url()),
        }
    }
}
