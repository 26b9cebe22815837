//! Jellyfin (and Emby compatible) media-server client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::gateway::{check_status, map_records, parse_base_url, GatewayError, MediaServer, Session};
use crate::model::{MediaKind, WatchRecord};

pub mod model;

use model::{AuthResponse, ItemsResponse};

const SERVICE: &str = "jellyfin";
const CLIENT_NAME: &str = "unwatched-reaper";

#[derive(Clone)]
pub struct JellyfinClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
    device_id: String,
}

impl fmt::Debug for JellyfinClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JellyfinClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl JellyfinClient {
    pub fn new(base_url: &str, username: String, password: String) -> Result<Self, GatewayError> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(concat!("unwatched-reaper/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            base_url,
            username,
            password,
            device_id: Uuid::new_v4().to_string(),
        })
    }

    /// Value for the `X-Emby-Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            CLIENT_NAME,
            CLIENT_NAME,
            self.device_id,
            env!("CARGO_PKG_VERSION")
        )
    }

    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Url(format!("{}: {}", path, e)))
    }

    pub fn build_items_request(
        &self,
        session: &Session,
        item_type: &str,
    ) -> Result<reqwest::Request, GatewayError> {
        let url = self.endpoint(&format!("Users/{}/Items", session.user_id))?;
        Ok(self
            .http
            .get(url)
            .query(&[
                ("IncludeItemTypes", item_type),
                ("Recursive", "true"),
                ("Fields", "DateCreated"),
                ("EnableUserData", "true"),
            ])
            .header("X-Emby-Token", &session.token)
            .header("X-Emby-Authorization", self.authorization_header())
            .build()?)
    }

    async fn list_items(
        &self,
        session: &Session,
        kind: MediaKind,
    ) -> Result<Vec<WatchRecord>, GatewayError> {
        let item_type = match kind {
            MediaKind::Series => "Episode",
            MediaKind::Movies => "Movie",
        };
        let request = self.build_items_request(session, item_type)?;
        debug!(url = %request.url(), "listing media server items");
        let res = check_status(SERVICE, self.http.execute(request).await?).await?;
        let payload: ItemsResponse = res.json().await.map_err(|e| GatewayError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;
        let records = map_records(SERVICE, payload.items, |item| item.into_record(kind));
        info!(kind = %kind, count = records.len(), "listed media server items");
        Ok(records)
    }
}

#[async_trait]
impl MediaServer for JellyfinClient {
    async fn authenticate(&self) -> Result<Session, GatewayError> {
        let url = self.endpoint("Users/AuthenticateByName")?;
        let res = self
            .http
            .post(url)
            .header("X-Emby-Authorization", self.authorization_header())
            .json(&json!({ "Username": self.username, "Pw": self.password }))
            .send()
            .await?;

        if matches!(res.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(GatewayError::Auth(format!(
                "media server rejected credentials for user '{}'",
                self.username
            )));
        }
        let res = check_status(SERVICE, res).await?;
        let auth: AuthResponse = res.json().await.map_err(|e| GatewayError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;
        if auth.access_token.is_empty() {
            return Err(GatewayError::Auth("media server returned an empty access token".into()));
        }
        info!(user_id = %auth.user.id, "authenticated with media server");
        Ok(Session {
            user_id: auth.user.id,
            token: auth.access_token,
        })
    }

    async fn list_episodes(&self, session: &Session) -> Result<Vec<WatchRecord>, GatewayError> {
        self.list_items(session, MediaKind::Series).await
    }

    async fn list_movies(&self, session: &Session) -> Result<Vec<WatchRecord>, GatewayError> {
        self.list_items(session, MediaKind::Movies).await
    }
}
