//! Plain-text rendering of candidates and run results.

use std::fmt::Write;

use crate::model::{GroupSummary, MediaKind, PendingAction, RunResult};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes as binary gigabytes with two decimals, e.g. `2.79 GB`.
pub fn format_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / BYTES_PER_GB)
}

pub fn render_group_summary(kind: MediaKind, summary: &GroupSummary, days: i64) -> String {
    let noun = match kind {
        MediaKind::Series => "series",
        MediaKind::Movies => "movies",
    };
    let mut out = String::new();
    let _ = writeln!(out, "{} {} on the media server", summary.total, noun);
    let _ = writeln!(out, "  fully watched:        {}", summary.fully_watched);
    let _ = writeln!(out, "  partially watched:    {}", summary.partially_watched);
    let _ = writeln!(out, "  unwatched, recent:    {}", summary.unwatched_recent);
    let _ = writeln!(out, "  unwatched, >{} days: {}", days, summary.stale);
    out
}

pub fn render_candidates(kind: MediaKind, actions: &[PendingAction]) -> String {
    if actions.is_empty() {
        return format!("No {} to remove.\n", kind);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{} {} to remove:", actions.len(), kind);
    for action in actions {
        match kind {
            MediaKind::Series => {
                let _ = writeln!(
                    out,
                    "  - {} ({} files, {})",
                    action.title,
                    action.file_count,
                    format_gb(action.size_bytes)
                );
            }
            MediaKind::Movies => {
                let _ = writeln!(out, "  - {} ({})", action.title, format_gb(action.size_bytes));
            }
        }
    }
    out
}

pub fn render_result(result: &RunResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {} stale, {} matched in catalog",
        result.kind, result.candidate_count, result.matched_count
    );
    if result.mode.is_live() {
        let _ = writeln!(
            out,
            "  freed {} across {} files",
            format_gb(result.total_bytes),
            result.total_files
        );
        let _ = writeln!(
            out,
            "  deleted: {}  skipped: {}  errors: {}  unmonitored: {}",
            result.deleted_file_count,
            result.skipped_file_count,
            result.errors.len(),
            result.unmonitored_count
        );
        for err in &result.errors {
            match err.file_id {
                Some(id) => {
                    let _ = writeln!(out, "  ! {} (file {}): {}", err.title, id, err.message);
                }
                None => {
                    let _ = writeln!(out, "  ! {}: {}", err.title, err.message);
                }
            }
        }
    } else {
        let _ = writeln!(
            out,
            "  would free {} across {} files (dry run, pass --execute to delete)",
            format_gb(result.total_bytes),
            result.total_files
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemError, Mode};

    #[test]
    fn three_billion_bytes_is_2_79_gb() {
        assert_eq!(format_gb(3_000_000_000), "2.79 GB");
        assert_eq!(format_gb(0), "0.00 GB");
        assert_eq!(format_gb(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn dry_run_result_mentions_projection() {
        let mut result = RunResult::new(MediaKind::Series, Mode::DryRun);
        result.candidate_count = 4;
        result.matched_count = 1;
        result.total_bytes = 3_000_000_000;
        result.total_files = 3;
        let text = render_result(&result);
        assert!(text.contains("4 stale, 1 matched"));
        assert!(text.contains("would free 2.79 GB across 3 files"));
    }

    #[test]
    fn live_result_lists_errors() {
        let mut result = RunResult::new(MediaKind::Movies, Mode::Live);
        result.deleted_file_count = 1;
        result.errors.push(ItemError {
            title: "Film".into(),
            file_id: Some(9),
            message: "radarr returned 500: busy".into(),
        });
        let text = render_result(&result);
        assert!(text.contains("deleted: 1"));
        assert!(text.contains("! Film (file 9): radarr returned 500: busy"));
    }

    #[test]
    fn candidates_list_titles() {
        let actions = vec![PendingAction {
            title: "Show".into(),
            catalog_id: 1,
            file_count: 3,
            size_bytes: 3_000_000_000,
            file_ids: Vec::new(),
        }];
        let text = render_candidates(MediaKind::Series, &actions);
        assert!(text.contains("- Show (3 files, 2.79 GB)"));
        assert_eq!(render_candidates(MediaKind::Movies, &[]), "No movies to remove.\n");
    }
}
