use anyhow::{bail, Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unwatched_reaper::arr::ArrClient;
use unwatched_reaper::config::{self, Overrides};
use unwatched_reaper::gateway::CatalogGateway;
use unwatched_reaper::jellyfin::JellyfinClient;
use unwatched_reaper::model::MediaKind;
use unwatched_reaper::pipeline::{self, RunSettings};
use unwatched_reaper::report;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Series,
    Movies,
}

impl From<KindArg> for MediaKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Series => MediaKind::Series,
            KindArg::Movies => MediaKind::Movies,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Delete series and movies nobody has watched, and stop re-downloading them"
)]
struct Args {
    /// Optional YAML config file; flags and environment override it
    #[arg(long, env = "REAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Age threshold in days (default 365)
    #[arg(long, env = "DAYS")]
    days: Option<i64>,

    /// Only report what would be removed (the default). DRY_RUN=false switches to live mode
    #[arg(
        short = 'd',
        long,
        env = "DRY_RUN",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = FalseyValueParser::new()
    )]
    dry_run: Option<bool>,

    /// Delete files and unmonitor; overrides --dry-run
    #[arg(
        short = 'e',
        long,
        env = "EXECUTE",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    execute: bool,

    /// Restrict the run to one media kind
    #[arg(long, value_enum)]
    only: Option<KindArg>,

    /// Debug logging when RUST_LOG is not set
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, env = "JELLYFIN_URL")]
    jellyfin_url: Option<String>,

    #[arg(long, env = "JELLYFIN_USERNAME")]
    jellyfin_username: Option<String>,

    #[arg(long, env = "JELLYFIN_PASSWORD", hide_env_values = true)]
    jellyfin_password: Option<String>,

    #[arg(long, env = "SONARR_URL")]
    sonarr_url: Option<String>,

    #[arg(long, env = "SONARR_API_KEY", hide_env_values = true)]
    sonarr_api_key: Option<String>,

    #[arg(long, env = "RADARR_URL")]
    radarr_url: Option<String>,

    #[arg(long, env = "RADARR_API_KEY", hide_env_values = true)]
    radarr_api_key: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            days: self.days,
            dry_run: self.dry_run,
            execute: self.execute,
            jellyfin_url: self.jellyfin_url.clone(),
            jellyfin_username: self.jellyfin_username.clone(),
            jellyfin_password: self.jellyfin_password.clone(),
            sonarr_url: self.sonarr_url.clone(),
            sonarr_api_key: self.sonarr_api_key.clone(),
            radarr_url: self.radarr_url.clone(),
            radarr_api_key: self.radarr_api_key.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cfg = config::resolve(args.config.as_deref(), args.overrides())?;
    let settings = RunSettings::from(&cfg);

    let mut kinds = cfg.enabled_kinds();
    if let Some(only) = args.only {
        let only = MediaKind::from(only);
        if !kinds.contains(&only) {
            bail!("--only {} requested but that catalog has no API key", only);
        }
        kinds = vec![only];
    }

    let media = JellyfinClient::new(
        &cfg.jellyfin.url,
        cfg.jellyfin.username.clone(),
        cfg.jellyfin.password.clone(),
    )
    .context("invalid media server settings")?;

    let mut clients = Vec::with_capacity(kinds.len());
    for kind in &kinds {
        let client = match kind {
            MediaKind::Series => ArrClient::sonarr(&cfg.sonarr.url, cfg.sonarr.api_key.clone()),
            MediaKind::Movies => ArrClient::radarr(&cfg.radarr.url, cfg.radarr.api_key.clone()),
        }
        .with_context(|| format!("invalid {} catalog settings", kind))?;
        clients.push(client);
    }
    let catalogs: Vec<&dyn CatalogGateway> =
        clients.iter().map(|c| c as &dyn CatalogGateway).collect();

    info!(
        days = settings.age_threshold_days,
        mode = ?settings.mode,
        kinds = ?kinds,
        "starting run"
    );

    let reports = pipeline::run(&settings, &media, &catalogs, chrono::Utc::now()).await?;

    for kind_report in &reports {
        let kind = kind_report.result.kind;
        println!(
            "{}",
            report::render_group_summary(kind, &kind_report.summary, settings.age_threshold_days)
        );
        println!("{}", report::render_candidates(kind, &kind_report.actions));
        if kind_report.shadowed_duplicates > 0 {
            println!(
                "note: {} duplicate {} titles in the catalog were ignored\n",
                kind_report.shadowed_duplicates, kind
            );
        }
        println!("{}", report::render_result(&kind_report.result));
    }

    Ok(())
}
