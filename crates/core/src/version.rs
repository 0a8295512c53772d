//! Version tokens exchanged with clients.
//!
//! REST carries the version as a quoted entity tag (`If-Match: "3"`); the graph
//! front end passes it as a bare string argument. Both funnel through here so
//! missing and malformed versions are reported identically.

use crate::error::{DomainError, DomainResult};

/// Render a version as an entity tag (`3` → `"3"`).
pub fn format_etag(version: u64) -> String {
    format!("\"{version}\"")
}

/// Parse a quoted entity tag such as `"3"`.
pub fn parse_etag(raw: Option<&str>) -> DomainResult<u64> {
    let raw = raw.ok_or(DomainError::VersionMissing)?;
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::VersionMalformed(raw.to_string()))?;
    inner
        .parse::<u64>()
        .map_err(|_| DomainError::VersionMalformed(raw.to_string()))
}

/// Parse a bare version number such as `3`.
pub fn parse_version(raw: Option<&str>) -> DomainResult<u64> {
    let raw = raw.ok_or(DomainError::VersionMissing)?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| DomainError::VersionMalformed(raw.to_string()))
}
