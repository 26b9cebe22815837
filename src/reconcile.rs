//! Decision logic: grouping watch records, classifying stale groups, joining
//! them against a catalog and sizing the result. Nothing here performs I/O.

use chrono::{DateTime, Utc};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::model::{
    CatalogEntry, GroupSummary, Impact, MediaGroup, MediaKind, PendingAction, WatchRecord,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Build every group for `kind`, in first-seen order.
///
/// Series records are grouped by their series name; a record without one
/// cannot be attributed and is skipped. Movies are singleton groups keyed by
/// their own title.
pub fn group_records(records: &[WatchRecord], kind: MediaKind) -> Vec<MediaGroup> {
    let mut groups: Vec<MediaGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if kind == MediaKind::Movies {
            groups.push(MediaGroup {
                group_key: record.title.clone(),
                member_count: 1,
                watched_count: usize::from(record.watched),
                oldest_created_at: record.created_at,
            });
            continue;
        }

        let key = match record.group_key.as_deref().filter(|k| !k.is_empty()) {
            Some(k) => k,
            None => continue,
        };
        match index.get(key) {
            Some(&pos) => {
                let group = &mut groups[pos];
                group.member_count += 1;
                if record.watched {
                    group.watched_count += 1;
                }
                if record.created_at < group.oldest_created_at {
                    group.oldest_created_at = record.created_at;
                }
            }
            None => {
                index.insert(key, groups.len());
                groups.push(MediaGroup {
                    group_key: key.to_string(),
                    member_count: 1,
                    watched_count: usize::from(record.watched),
                    oldest_created_at: record.created_at,
                });
            }
        }
    }

    groups
}

/// Elapsed time between `since` and `now`, rounded up to whole days.
pub fn age_in_days(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (now - since).num_seconds();
    -((-secs).div_euclid(SECONDS_PER_DAY))
}

pub fn is_stale(group: &MediaGroup, age_threshold_days: i64, now: DateTime<Utc>) -> bool {
    group.watched_count == 0
        && group.member_count > 0
        && age_in_days(group.oldest_created_at, now) > age_threshold_days
}

/// Groups with no watched member whose oldest member is past the threshold.
pub fn classify_stale_groups(
    records: &[WatchRecord],
    age_threshold_days: i64,
    now: DateTime<Utc>,
    kind: MediaKind,
) -> Vec<MediaGroup> {
    group_records(records, kind)
        .into_iter()
        .filter(|g| is_stale(g, age_threshold_days, now))
        .collect()
}

pub fn summarize_groups(
    groups: &[MediaGroup],
    age_threshold_days: i64,
    now: DateTime<Utc>,
) -> GroupSummary {
    let mut summary = GroupSummary {
        total: groups.len(),
        ..Default::default()
    };
    for group in groups {
        if is_stale(group, age_threshold_days, now) {
            summary.stale += 1;
        } else if group.watched_count == 0 {
            summary.unwatched_recent += 1;
        } else if group.watched_count == group.member_count {
            summary.fully_watched += 1;
        } else {
            summary.partially_watched += 1;
        }
    }
    summary
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub actions: Vec<PendingAction>,
    /// Catalog entries unreachable because an earlier entry has the same title.
    pub shadowed_duplicates: usize,
}

/// Join stale groups to catalog entries by exact, case-sensitive title.
///
/// The first catalog entry with a given title wins. Movies additionally need
/// at least one backing file. Groups without a match are dropped and the
/// output follows the order of `groups`.
pub fn match_against_catalog(
    groups: &[MediaGroup],
    catalog: &[CatalogEntry],
    kind: MediaKind,
) -> MatchOutcome {
    let mut by_title: HashMap<&str, &CatalogEntry> = HashMap::with_capacity(catalog.len());
    let mut shadowed_duplicates = 0;
    for entry in catalog {
        match by_title.entry(entry.title.as_str()) {
            Entry::Occupied(_) => shadowed_duplicates += 1,
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    let actions = groups
        .iter()
        .filter_map(|group| by_title.get(group.group_key.as_str()))
        .filter(|entry| kind == MediaKind::Series || entry.file_count > 0)
        .map(|entry| PendingAction::from_entry(entry))
        .collect();

    MatchOutcome {
        actions,
        shadowed_duplicates,
    }
}

/// Files and bytes a set of actions would free.
pub fn aggregate_impact(actions: &[PendingAction], kind: MediaKind) -> Impact {
    let total_bytes = actions.iter().map(|a| a.size_bytes).sum();
    let total_files = match kind {
        MediaKind::Series => actions.iter().map(|a| a.file_count).sum(),
        MediaKind::Movies => actions.len() as u64,
    };
    Impact {
        total_files,
        total_bytes,
    }
}
