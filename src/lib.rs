//! Find media nobody has watched for a long time and reclaim its disk space.
//!
//! Watch state comes from a Jellyfin media server; files and monitoring live
//! in Sonarr (series) and Radarr (movies). Titles are joined across the two.

pub mod arr;
pub mod config;
pub mod executor;
pub mod gateway;
pub mod jellyfin;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod report;
