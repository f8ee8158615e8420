use sha2::{Digest, Sha256};

/// Strong entity tag for a response body: the quoted SHA-256 hex digest.
pub fn etag(body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body);
    let result = hasher.finalize();

    format!("\"{:x}\"", result)
}

/// Whether an `If-None-Match` header value names `etag` (or is `*`).
pub fn matches_etag(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .map(|tag| tag.strip_prefix("W/").unwrap_or(tag))
        .any(|tag| tag == "*" || tag == etag)
}
