use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::gateway::MappingError;
use crate::model::{MediaKind, WatchRecord};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct AuthUser {
    pub id: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<BaseItem>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct BaseItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub series_name: Option<String>,
    pub date_created: Option<String>,
    pub user_data: Option<UserData>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "PascalCase")]
pub struct UserData {
    #[serde(default)]
    pub play_count: u64,
}

impl BaseItem {
    /// Validate and convert into a `WatchRecord`. The series name is kept
    /// only for episodes; movies never carry a group key.
    pub fn into_record(self, kind: MediaKind) -> Result<WatchRecord, MappingError> {
        let id = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or(MappingError::Missing("Id"))?;
        let title = self.name.ok_or(MappingError::Missing("Name"))?;
        let raw_date = self.date_created.ok_or(MappingError::Missing("DateCreated"))?;
        let created_at = DateTime::parse_from_rfc3339(&raw_date)
            .map_err(|e| MappingError::Invalid {
                field: "DateCreated",
                reason: format!("{}: {}", raw_date, e),
            })?
            .with_timezone(&Utc);
        let group_key = match kind {
            MediaKind::Series => self.series_name.filter(|s| !s.is_empty()),
            MediaKind::Movies => None,
        };
        let watched = self.user_data.map(|u| u.play_count > 0).unwrap_or(false);
        Ok(WatchRecord {
            id,
            title,
            group_key,
            created_at,
            watched,
        })
    }
}
