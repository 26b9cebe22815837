//! HTTP client for Sonarr/Radarr style catalogs (API v3).

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

use crate::gateway::{check_status, map_records, parse_base_url, CatalogGateway, GatewayError};
use crate::model::{CatalogEntry, MediaKind};

pub mod model;

use model::{EpisodeResource, MovieFileResource, MovieResource, SeriesResource};

#[derive(Clone)]
pub struct ArrClient {
    http: Client,
    base_url: Url,
    api_key: String,
    kind: MediaKind,
}

impl fmt::Debug for ArrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrClient")
            .field("service", &self.service())
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ArrClient {
    /// Client for a Sonarr instance.
    pub fn sonarr(base_url: &str, api_key: String) -> Result<Self, GatewayError> {
        Self::new(MediaKind::Series, base_url, api_key)
    }

    /// Client for a Radarr instance.
    pub fn radarr(base_url: &str, api_key: String) -> Result<Self, GatewayError> {
        Self::new(MediaKind::Movies, base_url, api_key)
    }

    pub fn new(kind: MediaKind, base_url: &str, api_key: String) -> Result<Self, GatewayError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(concat!("unwatched-reaper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            kind,
        })
    }

    pub fn service(&self) -> &'static str {
        match self.kind {
            MediaKind::Series => "sonarr",
            MediaKind::Movies => "radarr",
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Url(format!("{}: {}", path, e)))
    }

    pub fn build_request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request, GatewayError> {
        let mut builder = self
            .http
            .request(method, self.endpoint(path)?)
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    async fn send(&self, request: reqwest::Request) -> Result<Response, GatewayError> {
        debug!(
            service = self.service(),
            method = %request.method(),
            url = %request.url(),
            "catalog request"
        );
        let res = self.http.execute(request).await?;
        check_status(self.service(), res).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let request = self.build_request(reqwest::Method::GET, path, None)?;
        let res = self.send(request).await?;
        res.json::<T>().await.map_err(|e| GatewayError::Decode {
            service: self.service(),
            message: e.to_string(),
        })
    }

    fn file_path(&self, file_id: i64) -> String {
        match self.kind {
            MediaKind::Series => format!("api/v3/episodefile/{}", file_id),
            MediaKind::Movies => format!("api/v3/moviefile/{}", file_id),
        }
    }
}

#[async_trait]
impl CatalogGateway for ArrClient {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    async fn list_entries(&self) -> Result<Vec<CatalogEntry>, GatewayError> {
        let entries = match self.kind {
            MediaKind::Series => {
                let raw: Vec<SeriesResource> = self.get_json("api/v3/series").await?;
                map_records(self.service(), raw, CatalogEntry::try_from)
            }
            MediaKind::Movies => {
                let raw: Vec<MovieResource> = self.get_json("api/v3/movie").await?;
                map_records(self.service(), raw, CatalogEntry::try_from)
            }
        };
        info!(service = self.service(), count = entries.len(), "listed catalog entries");
        Ok(entries)
    }

    async fn list_child_file_ids(&self, catalog_id: i64) -> Result<Vec<i64>, GatewayError> {
        let ids: Vec<i64> = match self.kind {
            MediaKind::Series => {
                let episodes: Vec<EpisodeResource> = self
                    .get_json(&format!("api/v3/episode?seriesId={}", catalog_id))
                    .await?;
                episodes.into_iter().map(|e| e.episode_file_id).collect()
            }
            MediaKind::Movies => {
                let files: Vec<MovieFileResource> = self
                    .get_json(&format!("api/v3/moviefile?movieId={}", catalog_id))
                    .await?;
                files.into_iter().map(|f| f.id).collect()
            }
        };
        Ok(ids)
    }

    async fn delete_file(&self, file_id: i64) -> Result<(), GatewayError> {
        let request = self.build_request(reqwest::Method::DELETE, &self.file_path(file_id), None)?;
        self.send(request).await?;
        Ok(())
    }

    async fn set_monitored(&self, catalog_id: i64, monitored: bool) -> Result<(), GatewayError> {
        let (path, body) = match self.kind {
            MediaKind::Series => (
                "api/v3/series/editor",
                json!({ "seriesIds": [catalog_id], "monitored": monitored }),
            ),
            MediaKind::Movies => (
                "api/v3/movie/editor",
                json!({ "movieIds": [catalog_id], "monitored": monitored }),
            ),
        };
        let request = self.build_request(reqwest::Method::PUT, path, Some(&body))?;
        self.send(request).await?;
        Ok(())
    }
}
