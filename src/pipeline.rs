//! Per-kind run: fetch watch state, classify, match against the catalog,
//! then hand the actions to the executor.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::executor;
use crate::gateway::{CatalogGateway, MediaServer, Session};
use crate::model::{GroupSummary, MediaKind, Mode, PendingAction, RunResult};
use crate::reconcile::{
    classify_stale_groups, group_records, match_against_catalog, summarize_groups,
};

/// Policy for one run, fixed before any backend is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub age_threshold_days: i64,
    pub mode: Mode,
}

impl From<&Config> for RunSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            age_threshold_days: cfg.app.days,
            mode: cfg.mode(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KindReport {
    pub summary: GroupSummary,
    pub actions: Vec<PendingAction>,
    pub shadowed_duplicates: usize,
    pub result: RunResult,
}

#[instrument(skip_all, fields(kind = %catalog.kind()))]
pub async fn run_kind(
    settings: &RunSettings,
    media: &dyn MediaServer,
    session: &Session,
    catalog: &dyn CatalogGateway,
    now: DateTime<Utc>,
) -> Result<KindReport> {
    let kind = catalog.kind();
    let records = match kind {
        MediaKind::Series => media.list_episodes(session).await,
        MediaKind::Movies => media.list_movies(session).await,
    }
    .with_context(|| format!("failed to list {} from the media server", kind))?;

    let groups = group_records(&records, kind);
    let summary = summarize_groups(&groups, settings.age_threshold_days, now);
    let stale = classify_stale_groups(&records, settings.age_threshold_days, now, kind);
    info!(
        records = records.len(),
        groups = summary.total,
        stale = stale.len(),
        "classified media"
    );

    let entries = catalog
        .list_entries()
        .await
        .with_context(|| format!("failed to list the {} catalog", kind))?;
    let outcome = match_against_catalog(&stale, &entries, kind);
    if outcome.shadowed_duplicates > 0 {
        warn!(
            shadowed = outcome.shadowed_duplicates,
            "catalog has duplicate titles; only the first of each is matched"
        );
    }

    let mut result = executor::execute(&outcome.actions, settings.mode, catalog).await;
    result.candidate_count = stale.len();

    Ok(KindReport {
        summary,
        actions: outcome.actions,
        shadowed_duplicates: outcome.shadowed_duplicates,
        result,
    })
}

/// Authenticate once, then process each catalog in order.
pub async fn run(
    settings: &RunSettings,
    media: &dyn MediaServer,
    catalogs: &[&dyn CatalogGateway],
    now: DateTime<Utc>,
) -> Result<Vec<KindReport>> {
    let session = media
        .authenticate()
        .await
        .context("media server authentication failed")?;

    let mut reports = Vec::with_capacity(catalogs.len());
    for catalog in catalogs {
        reports.push(run_kind(settings, media, &session, *catalog, now).await?);
    }
    Ok(reports)
}
