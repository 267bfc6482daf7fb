//! Synthetic trace generator for demos and load testing the viewer

use crate::har::{Content, HarEntry, Header, Request, Response, Timings};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];
const STATUSES: &[u16] = &[200, 201, 204, 301, 302, 304, 400, 401, 403, 404, 500, 502, 503];
const MIME_TYPES: &[&str] = &[
    "text/html",
    "text/css",
    "application/javascript",
    "application/json",
    "image/png",
    "image/jpeg",
    "image/svg+xml",
    "font/woff2",
    "application/octet-stream",
];
const DOMAINS: &[&str] = &[
    "api.example.com",
    "cdn.example.com",
    "www.google.com",
    "fonts.googleapis.com",
    "analytics.google.com",
    "api.github.com",
    "unpkg.com",
    "cdnjs.cloudflare.com",
];
const PATHS: &[&str] = &[
    "/api/users",
    "/api/posts",
    "/assets/main.css",
    "/assets/app.js",
    "/images/logo.png",
    "/fonts/inter.woff2",
    "/api/auth/login",
    "/api/data",
    "/favicon.ico",
    "/robots.txt",
    "/sitemap.xml",
    "/api/search",
    "/assets/vendor.js",
    "/styles/theme.css",
];

/// Milliseconds between consecutive generated requests
pub const SPACING_MS: i64 = 100;

/// Reason phrase for the status codes the generator emits
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn pick<T: Copy, R: Rng>(items: &[T], rng: &mut R) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Generate `count` plausible entries starting at `base`
pub fn generate_entries<R: Rng>(count: usize, base: DateTime<Utc>, rng: &mut R) -> Vec<HarEntry> {
    (0..count)
        .map(|i| generate_entry(base + Duration::milliseconds(i as i64 * SPACING_MS), rng))
        .collect()
}

/// One random entry starting at `started`
pub fn generate_entry<R: Rng>(started: DateTime<Utc>, rng: &mut R) -> HarEntry {
    let method = pick(METHODS, rng);
    let status = pick(STATUSES, rng);
    let mime_type = pick(MIME_TYPES, rng);
    let domain = pick(DOMAINS, rng);
    let path = pick(PATHS, rng);
    let size: i64 = rng.gen_range(0..1_000_000);
    let time: f64 = rng.gen_range(0.0..2_000.0);

    HarEntry {
        started_date_time: started,
        time,
        request: Request {
            method: method.to_string(),
            url: format!("https://{}{}", domain, path),
            http_version: "HTTP/2.0".to_string(),
            headers: vec![
                Header::new(":method", method),
                Header::new(":authority", domain),
                Header::new(":scheme", "https"),
                Header::new(":path", path),
                Header::new("user-agent", "Mozilla/5.0"),
                Header::new("accept", "*/*"),
            ],
            cookies: vec![],
            query_string: vec![],
            post_data: None,
            headers_size: 500,
            body_size: if method == "GET" { 0 } else { rng.gen_range(0..1_000) },
        },
        response: Response {
            status,
            status_text: status_text(status).to_string(),
            http_version: "HTTP/2.0".to_string(),
            headers: vec![
                Header::new("content-type", mime_type),
                Header::new("cache-control", "max-age=3600"),
                Header::new("date", started.to_rfc2822()),
            ],
            cookies: vec![],
            content: Content {
                size,
                mime_type: mime_type.to_string(),
                text: None,
                encoding: None,
            },
            redirect_url: String::new(),
            headers_size: 300,
            body_size: size,
            transfer_size: Some((size as f64 * 0.3) as i64),
        },
        timings: Timings {
            blocked: Some(rng.gen_range(0.0..10.0)),
            dns: Some(rng.gen_range(0.0..50.0)),
            connect: Some(rng.gen_range(0.0..100.0)),
            ssl: Some(rng.gen_range(0.0..50.0)),
            send: Some(rng.gen_range(0.0..20.0)),
            wait: Some(rng.gen_range(0.0..500.0)),
            receive: Some(rng.gen_range(0.0..200.0)),
        },
        server_ip_address: Some(format!("192.168.{}.{}", rng.gen_range(0..255), rng.gen_range(0..255))),
        connection: None,
        pageref: None,
        initiator: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_entries_are_spaced_and_plausible() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let entries = generate_entries(20, base, &mut rng);

        assert_eq!(entries.len(), 20);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(
                entry.started_date_time,
                base + Duration::milliseconds(i as i64 * SPACING_MS)
            );
            assert!(METHODS.contains(&entry.request.method.as_str()));
            assert!(STATUSES.contains(&entry.response.status));
            assert_ne!(entry.response.status_text, "Unknown");
            assert!((0.0..2_000.0).contains(&entry.time));
            if entry.request.method == "GET" {
                assert_eq!(entry.request.body_size, 0);
            }
        }
    }

    #[test]
    fn test_same_seed_same_trace() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let a = generate_entries(5, base, &mut StdRng::seed_from_u64(1));
        let b = generate_entries(5, base, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_entries_parse_back() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entries = generate_entries(3, base, &mut StdRng::seed_from_u64(3));
        let archive = serde_json::json!({ "log": { "entries": entries } });
        let parsed = crate::ingest::parse_har(archive.to_string().as_bytes()).unwrap();
        assert_eq!(parsed.len(), 3);
    }
}
