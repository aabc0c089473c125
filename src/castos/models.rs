//! Castos v2 API payloads
//!
//! Only the fields the renumbering reads or writes are typed. Everything else the
//! API returns is kept in `extra` so cached records round-trip unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every Castos response wraps its payload in `data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
}

/// Row of the podcast episode listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeListPayload {
    pub id: u64,
    #[serde(default)]
    pub post_title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub post_data: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

/// Audio file attached to an episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeFile {
    #[serde(default)]
    pub id: Option<u64>,
    pub file_name: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full episode detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodePayload {
    pub id: u64,
    pub post_title: String,
    #[serde(default)]
    pub post_content: Option<String>,
    #[serde(default)]
    pub post_date: Option<String>,
    #[serde(default)]
    pub series_number: Option<String>,
    #[serde(default)]
    pub episode_number: Option<String>,
    pub file: EpisodeFile,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of an episode update; unset fields are left untouched by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_date: Option<String>,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn episode(id: u64, title: &str, file_name: &str) -> EpisodePayload {
        EpisodePayload {
            id,
            post_title: title.to_string(),
            post_content: None,
            post_date: None,
            series_number: None,
            episode_number: None,
            file: EpisodeFile {
                id: None,
                file_name: file_name.to_string(),
                file_path: None,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}
