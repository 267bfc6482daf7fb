//! HAR 1.2 record types
//!
//! Only the parts of the archive a viewer needs are modeled. Unknown fields
//! are ignored, optional collections default to empty, and sub-phase timings
//! of `-1` ("not measured") are normalized to `None`.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// One request/response exchange as recorded in the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarEntry {
    pub started_date_time: DateTime<Utc>,
    /// Total elapsed time in milliseconds
    pub time: f64,
    pub request: Request,
    pub response: Response,
    pub timings: Timings,
    #[serde(
        default,
        rename = "serverIPAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub server_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pageref: Option<String>,
    #[serde(default, rename = "_initiator", skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Initiator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub http_version: String,
    pub headers: Vec<Header>,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub query_string: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
    #[serde(default = "unknown_size")]
    pub headers_size: i64,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub http_version: String,
    pub headers: Vec<Header>,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    pub content: Content,
    #[serde(default, rename = "redirectURL")]
    pub redirect_url: String,
    #[serde(default = "unknown_size")]
    pub headers_size: i64,
    #[serde(default = "unknown_size")]
    pub body_size: i64,
    #[serde(
        default,
        rename = "_transferSize",
        skip_serializing_if = "Option::is_none"
    )]
    pub transfer_size: Option<i64>,
}

impl Request {
    /// Shell command reproducing the request. HTTP/2 pseudo-headers are
    /// skipped; a body is only attached for methods that carry one.
    pub fn to_curl(&self) -> String {
        let mut curl = format!("curl {} \\\n  -X {}", shell_quote(&self.url), self.method);
        for header in self.headers.iter().filter(|h| !h.name.starts_with(':')) {
            let line = format!("{}: {}", header.name, header.value);
            curl.push_str(&format!(" \\\n  -H {}", shell_quote(&line)));
        }
        let body = self.post_data.as_ref().and_then(|p| p.text.as_deref());
        if let Some(body) = body.filter(|_| matches!(self.method.as_str(), "POST" | "PUT" | "PATCH")) {
            curl.push_str(&format!(" \\\n  -d {}", shell_quote(body)));
        }
        curl
    }
}

fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

/// Name/value pair used for headers and query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Response body descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl Content {
    /// Body text, decoding base64 payloads. Binary bodies come back lossy.
    pub fn decoded_text(&self) -> Option<Cow<'_, str>> {
        let text = self.text.as_deref()?;
        if self.encoding.as_deref() == Some("base64") {
            let bytes = STANDARD.decode(text.trim()).ok()?;
            return Some(Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()));
        }
        Some(Cow::Borrowed(text))
    }
}

/// Sub-phase durations in milliseconds; `None` means not measured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub blocked: Option<f64>,
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub dns: Option<f64>,
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub connect: Option<f64>,
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub ssl: Option<f64>,
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub send: Option<f64>,
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub wait: Option<f64>,
    #[serde(default, deserialize_with = "phase", skip_serializing_if = "Option::is_none")]
    pub receive: Option<f64>,
}

/// Named timing phase, in the order a browser performs them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Queueing,
    Dns,
    Connect,
    Tls,
    Send,
    Wait,
    Receive,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Queueing => "Queueing",
            Phase::Dns => "DNS Lookup",
            Phase::Connect => "Initial connection",
            Phase::Tls => "SSL",
            Phase::Send => "Request sent",
            Phase::Wait => "Waiting (TTFB)",
            Phase::Receive => "Content Download",
        }
    }
}

impl Timings {
    /// Measured phases with a positive duration
    pub fn phases(&self) -> Vec<(Phase, f64)> {
        [
            (Phase::Queueing, self.blocked),
            (Phase::Dns, self.dns),
            (Phase::Connect, self.connect),
            (Phase::Tls, self.ssl),
            (Phase::Send, self.send),
            (Phase::Wait, self.wait),
            (Phase::Receive, self.receive),
        ]
        .into_iter()
        .filter_map(|(phase, ms)| ms.filter(|ms| *ms > 0.0).map(|ms| (phase, ms)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u64>,
}

fn unknown_size() -> i64 {
    -1
}

fn phase<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|ms| ms.is_finite() && *ms >= 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_curl_command() {
        let request: Request = serde_json::from_value(json!({
            "method": "POST",
            "url": "https://api.test/login",
            "headers": [
                {"name": ":authority", "value": "api.test"},
                {"name": "content-type", "value": "application/json"}
            ],
            "postData": {"mimeType": "application/json", "text": "{\"user\":\"o'neil\"}"}
        }))
        .unwrap();

        assert_eq!(
            request.to_curl(),
            "curl 'https://api.test/login' \\\n  -X POST \\\n  -H 'content-type: application/json' \\\n  -d '{\"user\":\"o'\\''neil\"}'"
        );
    }

    #[test]
    fn test_unmeasured_timings_are_absent() {
        let timings: Timings = serde_json::from_value(json!({
            "blocked": -1,
            "dns": 12.5,
            "send": 0,
            "wait": 40
        }))
        .unwrap();

        assert_eq!(timings.blocked, None);
        assert_eq!(timings.dns, Some(12.5));
        assert_eq!(timings.connect, None);
        assert_eq!(timings.send, Some(0.0));

        let phases = timings.phases();
        assert_eq!(phases, vec![(Phase::Dns, 12.5), (Phase::Wait, 40.0)]);
    }

    #[test]
    fn test_base64_body_is_decoded() {
        let content = Content {
            size: 5,
            mime_type: "text/plain".to_string(),
            text: Some("aGVsbG8=".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(content.decoded_text().as_deref(), Some("hello"));

        let plain = Content {
            encoding: None,
            text: Some("plain".to_string()),
            ..content
        };
        assert_eq!(plain.decoded_text().as_deref(), Some("plain"));
    }

    #[test]
    fn test_started_date_time_accepts_offsets() {
        let entry: HarEntry = serde_json::from_value(json!({
            "startedDateTime": "2024-03-01T12:00:00.250+01:00",
            "time": 10,
            "request": { "method": "GET", "url": "https://a.test/", "headers": [] },
            "response": { "status": 200, "headers": [], "content": {} },
            "timings": {}
        }))
        .unwrap();

        assert_eq!(
            entry.started_date_time.to_rfc3339(),
            "2024-03-01T11:00:00.250+00:00"
        );
        assert_eq!(entry.request.body_size, -1);
        assert!(entry.request.cookies.is_empty());
    }
}
