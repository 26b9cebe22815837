//! Contracts between the reconciliation core and the two backends.
//!
//! `MediaServer` reports what has been watched; `CatalogGateway` owns the
//! files and the monitoring flag. Both are implemented over HTTP in
//! `jellyfin` and `arr`, and by recording doubles in the tests.

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::model::{CatalogEntry, MediaKind, WatchRecord};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend reports the target does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response from {service}: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("invalid url: {0}")]
    Url(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }
}

/// Why a wire record could not become a domain record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),
    #[error("invalid field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Map wire records through `convert`, dropping and logging the ones that
/// fail validation.
pub fn map_records<W, T, F>(source: &str, raw: Vec<W>, mut convert: F) -> Vec<T>
where
    F: FnMut(W) -> Result<T, MappingError>,
{
    let total = raw.len();
    let mut out = Vec::with_capacity(total);
    let mut rejected = 0usize;
    for item in raw {
        match convert(item) {
            Ok(record) => out.push(record),
            Err(err) => {
                rejected += 1;
                warn!(source, error = %err, "rejected record");
            }
        }
    }
    if rejected > 0 {
        warn!(source, rejected, total, "some records were rejected during mapping");
    }
    out
}

/// Parse a base URL, guaranteeing a trailing slash so relative joins keep
/// any path prefix (reverse-proxied installs such as `/sonarr`).
pub fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash).map_err(|e| GatewayError::Url(format!("{}: {}", raw, e)))
}

/// Turn a non-success response into a `GatewayError`; 404 becomes `NotFound`.
pub async fn check_status(service: &'static str, res: Response) -> Result<Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(format!("{} {}", status, body).trim().to_string()));
    }
    Err(GatewayError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

/// Authenticated media-server session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
pub trait MediaServer: Send + Sync {
    async fn authenticate(&self) -> Result<Session, GatewayError>;

    async fn list_episodes(&self, session: &Session) -> Result<Vec<WatchRecord>, GatewayError>;

    async fn list_movies(&self, session: &Session) -> Result<Vec<WatchRecord>, GatewayError>;
}

#[async_trait]
pub trait CatalogGateway: Send + Sync {
    fn kind(&self) -> MediaKind;

    async fn list_entries(&self) -> Result<Vec<CatalogEntry>, GatewayError>;

    /// Backing file ids below a catalog entry (per-episode files for series).
    async fn list_child_file_ids(&self, catalog_id: i64) -> Result<Vec<i64>, GatewayError>;

    async fn delete_file(&self, file_id: i64) -> Result<(), GatewayError>;

    async fn set_monitored(&self, catalog_id: i64, monitored: bool) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_records_drops_invalid_items() {
        let raw = vec![Some(1), None, Some(3)];
        let out = map_records("test", raw, |v| v.ok_or(MappingError::Missing("value")));
        assert_eq!(out, vec![1, 3]);
    }

    #[test]
    fn session_debug_redacts_token() {
        let session = Session {
            user_id: "u1".into(),
            token: "secret".into(),
        };
        let rendered = format!("{:?}", session);
        assert!(rendered.contains("u1"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn not_found_is_distinguished() {
        assert!(GatewayError::NotFound("gone".into()).is_not_found());
        let other = GatewayError::Status {
            service: "sonarr",
            status: 500,
            body: "boom".into(),
        };
        assert!(!other.is_not_found());
        assert_eq!(other.to_string(), "sonarr returned 500: boom");
    }
}
