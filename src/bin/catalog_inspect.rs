use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use unwatched_reaper::arr::ArrClient;
use unwatched_reaper::config::{self, Overrides};
use unwatched_reaper::gateway::CatalogGateway;
use unwatched_reaper::report::format_gb;

/// List catalog entries as the matcher sees them, to debug title mismatches.
#[derive(Parser, Debug)]
struct Args {
    /// Optional YAML config file; flags and environment override it
    #[arg(long, env = "REAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Inspect Radarr instead of Sonarr
    #[arg(long)]
    movies: bool,

    /// Only show titles containing this substring
    #[arg(long)]
    filter: Option<String>,

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
    fn client(&self) -> Result<ArrClient> {
        let mut cfg = config::load(self.config.as_deref())?;
        cfg.apply(Overrides {
            sonarr_url: self.sonarr_url.clone(),
            sonarr_api_key: self.sonarr_api_key.clone(),
            radarr_url: self.radarr_url.clone(),
            radarr_api_key: self.radarr_api_key.clone(),
            ..Default::default()
        });

        let (name, catalog) = if self.movies {
            ("radarr", &cfg.radarr)
        } else {
            ("sonarr", &cfg.sonarr)
        };
        if !catalog.is_enabled() {
            bail!("no {name} API key: set {name}.api_key or --{name}-api-key");
        }
        let client = if self.movies {
            ArrClient::radarr(&catalog.url, catalog.api_key.clone())
        } else {
            ArrClient::sonarr(&catalog.url, catalog.api_key.clone())
        };
        client.with_context(|| format!("invalid {name} settings"))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = args.client()?;

    let entries = client
        .list_entries()
        .await
        .with_context(|| format!("failed to list {} catalog", client.service()))?;
    println!("{} entries in {}", entries.len(), client.service());
    for entry in entries {
        if let Some(filter) = &args.filter {
            if !entry.title.contains(filter.as_str()) {
                continue;
            }
        }
        println!(
            "  {:?} -> {{ id: {}, files: {}, size: {} }}",
            entry.title,
            entry.catalog_id,
            entry.file_count,
            format_gb(entry.size_bytes)
        );
    }
    Ok(())
}
