//! ETags for match views.
//!
//! A view only changes when the log grows, so `last_seq` plus the viewer's
//! seat identifies it exactly.

use actix_web::http::header::IF_NONE_MATCH;
use actix_web::HttpRequest;

use crate::domain::types::Seat;

/// `"match-{id}-s{seq}-{viewer}"`, quoted as HTTP requires.
pub fn view_etag(match_id: i64, last_seq: i64, viewer: Option<Seat>) -> String {
    let viewer = viewer.map_or_else(|| "spectator".to_string(), |seat| format!("seat{seat}"));
    format!(r#""match-{match_id}-s{last_seq}-{viewer}""#)
}

/// Whether `If-None-Match` already names `etag` (or is `*`).
pub fn not_modified(req: &HttpRequest, etag: &str) -> bool {
    let Some(header) = req.headers().get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let header = header.trim();
    header == "*"
        || header
            .split(',')
            .map(|tag| tag.trim().trim_start_matches("W/"))
            .any(|tag| tag == etag)
}
