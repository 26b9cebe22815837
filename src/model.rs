use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two media kinds a run reconciles. Each kind has its own catalog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Series,
    Movies,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Series => "series",
            MediaKind::Movies => "movies",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Live,
}

impl Mode {
    pub fn is_live(&self) -> bool {
        matches!(self, Mode::Live)
    }
}

/// One playable unit (episode or movie) as seen by the media server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchRecord {
    pub id: String,
    pub title: String,
    /// Series name for episodes, `None` for movies.
    pub group_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub watched: bool,
}

/// Records sharing a group key, or a single movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaGroup {
    pub group_key: String,
    pub member_count: usize,
    pub watched_count: usize,
    pub oldest_created_at: DateTime<Utc>,
}

impl MediaGroup {
    pub fn unwatched_count(&self) -> usize {
        self.member_count - self.watched_count
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub catalog_id: i64,
    pub file_count: u64,
    pub size_bytes: u64,
    /// Known backing file ids. Filled at listing time for movies; series
    /// files are enumerated lazily during execution.
    pub file_ids: Vec<i64>,
}

/// A matched, stale item scheduled for deletion and unmonitoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingAction {
    pub title: String,
    pub catalog_id: i64,
    pub file_count: u64,
    pub size_bytes: u64,
    pub file_ids: Vec<i64>,
}

impl PendingAction {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            catalog_id: entry.catalog_id,
            file_count: entry.file_count,
            size_bytes: entry.size_bytes,
            file_ids: entry.file_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Impact {
    pub total_files: u64,
    pub total_bytes: u64,
}

/// Outcome of a single delete attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Deleted,
    Skipped(SkipReason),
    Errored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The catalog reported no backing file for the item.
    NoFiles,
    /// The backend no longer has the file.
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemError {
    pub title: String,
    /// `None` when the failure is not tied to a file (unmonitor, enumeration).
    pub file_id: Option<i64>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunResult {
    pub kind: MediaKind,
    pub mode: Mode,
    pub candidate_count: usize,
    pub matched_count: usize,
    /// Projected from catalog statistics before any mutation.
    pub total_bytes: u64,
    pub total_files: u64,
    pub deleted_file_count: u64,
    pub skipped_file_count: u64,
    pub unmonitored_count: u64,
    pub errors: Vec<ItemError>,
}

impl RunResult {
    pub fn new(kind: MediaKind, mode: Mode) -> Self {
        Self {
            kind,
            mode,
            candidate_count: 0,
            matched_count: 0,
            total_bytes: 0,
            total_files: 0,
            deleted_file_count: 0,
            skipped_file_count: 0,
            unmonitored_count: 0,
            errors: Vec::new(),
        }
    }
}

/// Informational breakdown of every group seen for one kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupSummary {
    pub total: usize,
    pub fully_watched: usize,
    pub partially_watched: usize,
    pub unwatched_recent: usize,
    pub stale: usize,
}
