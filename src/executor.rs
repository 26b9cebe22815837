use tracing::{info, instrument, warn};

use crate::gateway::{CatalogGateway, GatewayError};
use crate::model::{FileOutcome, ItemError, MediaKind, Mode, PendingAction, RunResult, SkipReason};
use crate::reconcile::aggregate_impact;

/// Classify the result of one delete call. A missing file is benign.
pub fn classify_delete(result: Result<(), GatewayError>) -> FileOutcome {
    match result {
        Ok(()) => FileOutcome::Deleted,
        Err(err) if err.is_not_found() => FileOutcome::Skipped(SkipReason::NotFound),
        Err(err) => FileOutcome::Errored(err.to_string()),
    }
}

/// Fold one per-file outcome into the run counters.
pub fn apply_outcome(
    result: &mut RunResult,
    title: &str,
    file_id: Option<i64>,
    outcome: FileOutcome,
) {
    match outcome {
        FileOutcome::Deleted => result.deleted_file_count += 1,
        FileOutcome::Skipped(_) => result.skipped_file_count += 1,
        FileOutcome::Errored(message) => result.errors.push(ItemError {
            title: title.to_string(),
            file_id,
            message,
        }),
    }
}

/// Drop zero ids and repeats (multi-episode files), keeping first-seen order.
pub fn usable_file_ids(ids: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for &id in ids {
        if id != 0 && !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

async fn enumerate_files(
    action: &PendingAction,
    kind: MediaKind,
    gateway: &dyn CatalogGateway,
) -> Result<Vec<i64>, GatewayError> {
    match kind {
        MediaKind::Series => {
            let ids = gateway.list_child_file_ids(action.catalog_id).await?;
            Ok(usable_file_ids(&ids))
        }
        MediaKind::Movies => Ok(usable_file_ids(&action.file_ids)),
    }
}

fn has_no_files(action: &PendingAction, kind: MediaKind) -> bool {
    match kind {
        MediaKind::Series => action.file_count == 0,
        MediaKind::Movies => action.file_ids.iter().all(|&id| id == 0),
    }
}

/// Delete the files behind each action and stop monitoring it.
///
/// Actions run strictly in order, one call at a time. Individual failures are
/// recorded on the result and never abort the run; every action ends with an
/// unmonitor call. Byte totals are the pre-execution projection.
#[instrument(skip_all, fields(kind = %gateway.kind(), mode = ?mode, actions = actions.len()))]
pub async fn execute(
    actions: &[PendingAction],
    mode: Mode,
    gateway: &dyn CatalogGateway,
) -> RunResult {
    let kind = gateway.kind();
    let impact = aggregate_impact(actions, kind);
    let mut result = RunResult::new(kind, mode);
    result.matched_count = actions.len();
    result.total_bytes = impact.total_bytes;
    result.total_files = impact.total_files;

    if !mode.is_live() {
        info!(files = impact.total_files, bytes = impact.total_bytes, "dry run; no changes made");
        return result;
    }

    for (idx, action) in actions.iter().enumerate() {
        info!(
            position = idx + 1,
            total = actions.len(),
            title = %action.title,
            catalog_id = action.catalog_id,
            "processing"
        );

        let no_files = FileOutcome::Skipped(SkipReason::NoFiles);
        if has_no_files(action, kind) {
            apply_outcome(&mut result, &action.title, None, no_files);
        } else {
            match enumerate_files(action, kind, gateway).await {
                Ok(file_ids) if file_ids.is_empty() => {
                    apply_outcome(&mut result, &action.title, None, no_files);
                }
                Ok(file_ids) => {
                    for file_id in file_ids {
                        let outcome = classify_delete(gateway.delete_file(file_id).await);
                        match &outcome {
                            FileOutcome::Deleted => {
                                info!(title = %action.title, file_id, "deleted file")
                            }
                            FileOutcome::Skipped(_) => {
                                info!(title = %action.title, file_id, "file already gone; skipped")
                            }
                            FileOutcome::Errored(message) => {
                                warn!(
                                    title = %action.title,
                                    file_id,
                                    error = %message,
                                    "failed to delete file"
                                )
                            }
                        }
                        apply_outcome(&mut result, &action.title, Some(file_id), outcome);
                    }
                }
                Err(err) => {
                    warn!(title = %action.title, error = %err, "failed to enumerate files");
                    let outcome = FileOutcome::Errored(err.to_string());
                    apply_outcome(&mut result, &action.title, None, outcome);
                }
            }
        }

        match gateway.set_monitored(action.catalog_id, false).await {
            Ok(()) => {
                result.unmonitored_count += 1;
                info!(title = %action.title, "unmonitored");
            }
            Err(err) => {
                warn!(title = %action.title, error = %err, "failed to unmonitor");
                result.errors.push(ItemError {
                    title: action.title.clone(),
                    file_id: None,
                    message: format!("unmonitor failed: {}", err),
                });
            }
        }
    }

    result
}
