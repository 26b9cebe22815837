#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use unwatched_reaper::gateway::{CatalogGateway, GatewayError, MediaServer, Session};
use unwatched_reaper::model::{CatalogEntry, MediaKind, PendingAction, WatchRecord};

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn episode(series: &str, days_ago: i64, watched: bool) -> WatchRecord {
    WatchRecord {
        id: format!("{}-{}", series, days_ago),
        title: format!("{} episode", series),
        group_key: Some(series.to_string()),
        created_at: now() - Duration::days(days_ago),
        watched,
    }
}

pub fn movie(title: &str, days_ago: i64, watched: bool) -> WatchRecord {
    WatchRecord {
        id: title.to_lowercase(),
        title: title.to_string(),
        group_key: None,
        created_at: now() - Duration::days(days_ago),
        watched,
    }
}

pub fn series_entry(title: &str, id: i64, files: u64, bytes: u64) -> CatalogEntry {
    CatalogEntry {
        title: title.into(),
        catalog_id: id,
        file_count: files,
        size_bytes: bytes,
        file_ids: Vec::new(),
    }
}

pub fn movie_entry(title: &str, id: i64, file_id: Option<i64>, bytes: u64) -> CatalogEntry {
    CatalogEntry {
        title: title.into(),
        catalog_id: id,
        file_count: u64::from(file_id.is_some()),
        size_bytes: bytes,
        file_ids: file_id.into_iter().collect(),
    }
}

pub fn action(title: &str, id: i64, files: u64, bytes: u64) -> PendingAction {
    PendingAction::from_entry(&series_entry(title, id, files, bytes))
}

/// Scripted response for a delete call.
#[derive(Debug, Clone)]
pub enum DeleteScript {
    NotFound,
    Fail(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListEntries,
    ListChildren(i64),
    Delete(i64),
    SetMonitored(i64, bool),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Delete(_) | Call::SetMonitored(_, _))
    }
}

#[derive(Clone)]
pub struct RecordingCatalog {
    pub kind: MediaKind,
    entries: Vec<CatalogEntry>,
    children: HashMap<i64, Vec<i64>>,
    delete_scripts: HashMap<i64, DeleteScript>,
    failing_children: Vec<i64>,
    failing_unmonitor: Vec<i64>,
    listing_unavailable: bool,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingCatalog {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            children: HashMap::new(),
            delete_scripts: HashMap::new(),
            failing_children: Vec::new(),
            failing_unmonitor: Vec::new(),
            listing_unavailable: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_entries(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_children(mut self, catalog_id: i64, file_ids: Vec<i64>) -> Self {
        self.children.insert(catalog_id, file_ids);
        self
    }

    pub fn with_delete(mut self, file_id: i64, script: DeleteScript) -> Self {
        self.delete_scripts.insert(file_id, script);
        self
    }

    pub fn failing_children_for(mut self, catalog_id: i64) -> Self {
        self.failing_children.push(catalog_id);
        self
    }

    pub fn failing_unmonitor_for(mut self, catalog_id: i64) -> Self {
        self.failing_unmonitor.push(catalog_id);
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.listing_unavailable = true;
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl CatalogGateway for RecordingCatalog {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn list_entries(&self) -> Result<Vec<CatalogEntry>, GatewayError> {
        self.record(Call::ListEntries).await;
        if self.listing_unavailable {
            return Err(GatewayError::Status {
                service: "catalog",
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.entries.clone())
    }

    async fn list_child_file_ids(&self, catalog_id: i64) -> Result<Vec<i64>, GatewayError> {
        self.record(Call::ListChildren(catalog_id)).await;
        if self.failing_children.contains(&catalog_id) {
            return Err(GatewayError::Status {
                service: "catalog",
                status: 500,
                body: "episode lookup failed".into(),
            });
        }
        Ok(self.children.get(&catalog_id).cloned().unwrap_or_default())
    }

    async fn delete_file(&self, file_id: i64) -> Result<(), GatewayError> {
        self.record(Call::Delete(file_id)).await;
        match self.delete_scripts.get(&file_id) {
            None => Ok(()),
            Some(DeleteScript::NotFound) => Err(GatewayError::NotFound("404 not found".into())),
            Some(DeleteScript::Fail(body)) => Err(GatewayError::Status {
                service: "catalog",
                status: 500,
                body: body.clone(),
            }),
        }
    }

    async fn set_monitored(&self, catalog_id: i64, monitored: bool) -> Result<(), GatewayError> {
        self.record(Call::SetMonitored(catalog_id, monitored)).await;
        if self.failing_unmonitor.contains(&catalog_id) {
            return Err(GatewayError::Status {
                service: "catalog",
                status: 500,
                body: "editor failed".into(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingMediaServer {
    episodes: Vec<WatchRecord>,
    movies: Vec<WatchRecord>,
    reject_auth: bool,
    auth_calls: Arc<Mutex<usize>>,
}

impl RecordingMediaServer {
    pub fn new(episodes: Vec<WatchRecord>, movies: Vec<WatchRecord>) -> Self {
        Self {
            episodes,
            movies,
            ..Default::default()
        }
    }

    pub fn rejecting_auth(mut self) -> Self {
        self.reject_auth = true;
        self
    }

    pub async fn auth_calls(&self) -> usize {
        *self.auth_calls.lock().await
    }
}

#[async_trait]
impl MediaServer for RecordingMediaServer {
    async fn authenticate(&self) -> Result<Session, GatewayError> {
        *self.auth_calls.lock().await += 1;
        if self.reject_auth {
            return Err(GatewayError::Auth("bad credentials".into()));
        }
        Ok(Session {
            user_id: "user".into(),
            token: "token".into(),
        })
    }

    async fn list_episodes(&self, _session: &Session) -> Result<Vec<WatchRecord>, GatewayError> {
        Ok(self.episodes.clone())
    }

    async fn list_movies(&self, _session: &Session) -> Result<Vec<WatchRecord>, GatewayError> {
        Ok(self.movies.clone())
    }
}
