use serde::Deserialize;

use crate::gateway::MappingError;
use crate::model::CatalogEntry;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResource {
    pub id: Option<i64>,
    pub title: Option<String>,
    #[serde(default)]
    pub statistics: Option<SeriesStatistics>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStatistics {
    #[serde(default)]
    pub episode_file_count: u64,
    #[serde(default)]
    pub size_on_disk: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MovieResource {
    pub id: Option<i64>,
    pub title: Option<String>,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub size_on_disk: u64,
    #[serde(default)]
    pub movie_file: Option<MovieFileResource>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MovieFileResource {
    pub id: i64,
    #[serde(default)]
    pub size: u64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeResource {
    pub id: i64,
    #[serde(default)]
    pub episode_file_id: i64,
}

fn required_title(title: Option<String>) -> Result<String, MappingError> {
    match title {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(MappingError::Missing("title")),
    }
}

impl TryFrom<SeriesResource> for CatalogEntry {
    type Error = MappingError;

    fn try_from(raw: SeriesResource) -> Result<Self, Self::Error> {
        let catalog_id = raw.id.ok_or(MappingError::Missing("id"))?;
        let title = required_title(raw.title)?;
        let stats = raw.statistics.unwrap_or_default();
        Ok(CatalogEntry {
            title,
            catalog_id,
            file_count: stats.episode_file_count,
            size_bytes: stats.size_on_disk,
            file_ids: Vec::new(),
        })
    }
}

impl TryFrom<MovieResource> for CatalogEntry {
    type Error = MappingError;

    fn try_from(raw: MovieResource) -> Result<Self, Self::Error> {
        let catalog_id = raw.id.ok_or(MappingError::Missing("id"))?;
        let title = required_title(raw.title)?;
        let file = raw.movie_file.filter(|f| raw.has_file && f.id != 0);
        let (file_count, file_ids, size_bytes) = match file {
            Some(f) => {
                let size = if f.size > 0 { f.size } else { raw.size_on_disk };
                (1, vec![f.id], size)
            }
            None => (0, Vec::new(), 0),
        };
        Ok(CatalogEntry {
            title,
            catalog_id,
            file_count,
            size_bytes,
            file_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_maps_statistics() {
        let raw: SeriesResource = serde_json::from_value(serde_json::json!({
            "id": 12,
            "title": "Show",
            "statistics": { "episodeFileCount": 4, "sizeOnDisk": 4096 }
        }))
        .unwrap();
        let entry = CatalogEntry::try_from(raw).unwrap();
        assert_eq!(entry.catalog_id, 12);
        assert_eq!(entry.file_count, 4);
        assert_eq!(entry.size_bytes, 4096);
        assert!(entry.file_ids.is_empty());
    }

    #[test]
    fn series_without_statistics_has_no_files() {
        let raw: SeriesResource =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "Bare" })).unwrap();
        let entry = CatalogEntry::try_from(raw).unwrap();
        assert_eq!(entry.file_count, 0);
        assert_eq!(entry.size_bytes, 0);
    }

    #[test]
    fn series_without_id_or_title_is_rejected() {
        let raw: SeriesResource =
            serde_json::from_value(serde_json::json!({ "title": "x" })).unwrap();
        assert_eq!(CatalogEntry::try_from(raw), Err(MappingError::Missing("id")));
        let raw: SeriesResource =
            serde_json::from_value(serde_json::json!({ "id": 3, "title": "" })).unwrap();
        assert_eq!(CatalogEntry::try_from(raw), Err(MappingError::Missing("title")));
    }

    #[test]
    fn movie_with_file_carries_its_id() {
        let raw: MovieResource = serde_json::from_value(serde_json::json!({
            "id": 5,
            "title": "Film",
            "hasFile": true,
            "sizeOnDisk": 900,
            "movieFile": { "id": 77, "size": 800 }
        }))
        .unwrap();
        let entry = CatalogEntry::try_from(raw).unwrap();
        assert_eq!(entry.file_count, 1);
        assert_eq!(entry.file_ids, vec![77]);
        assert_eq!(entry.size_bytes, 800);
    }

    #[test]
    fn movie_without_file_reports_zero() {
        let raw: MovieResource = serde_json::from_value(serde_json::json!({
            "id": 6,
            "title": "Wanted",
            "hasFile": false,
            "sizeOnDisk": 0
        }))
        .unwrap();
        let entry = CatalogEntry::try_from(raw).unwrap();
        assert_eq!(entry.file_count, 0);
        assert!(entry.file_ids.is_empty());
    }
}
