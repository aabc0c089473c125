pub mod cache;
pub mod fetcher;
pub mod models;
pub mod rate_limit;
pub mod updater;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use thiserror::Error;

use crate::config::AppConfig;
use models::{ApiEnvelope, EpisodeListPayload, EpisodePayload, EpisodeUpdatePayload};

/// Global HTTP client shared by every request of the run.
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// Returns a reference to the shared HTTP client.
pub fn http_client() -> &'static Client {
    HTTP_CLIENT.get_or_init(|| {
        Client::builder()
            .pool_max_idle_per_host(2)
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

#[derive(Debug, Error)]
pub enum CastosError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("castos returned {status} for {url}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response shape from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type CastosResult<T> = std::result::Result<T, CastosError>;

/// Per-episode operations the fetch and update stages depend on
#[async_trait]
pub trait EpisodeSource: Send + Sync {
    async fn get_episode(&self, id: u64) -> CastosResult<EpisodePayload>;

    async fn update_episode(&self, id: u64, payload: &EpisodeUpdatePayload) -> CastosResult<()>;
}

/// Thin client for the Castos v2 episode endpoints of a single podcast
#[derive(Debug, Clone)]
pub struct CastosClient {
    api_base: String,
    podcast_id: String,
    token: String,
}

impl CastosClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            podcast_id: config.podcast_id.clone(),
            token: config.token.clone(),
        }
    }

    fn episodes_url(&self) -> String {
        format!(
            "{}/podcasts/{}/episodes?token={}",
            self.api_base,
            self.podcast_id,
            urlencoding::encode(&self.token)
        )
    }

    fn episode_url(&self, id: u64) -> String {
        format!(
            "{}/podcasts/{}/episodes/{}?token={}",
            self.api_base,
            self.podcast_id,
            id,
            urlencoding::encode(&self.token)
        )
    }

    /// URL with the token stripped, for logs and errors
    fn redacted(url: &str) -> String {
        match url.split_once("token=") {
            Some((head, _)) => format!("{}token=***", head),
            None => url.to_string(),
        }
    }

    /// Lists the ids of every episode of the podcast, in API order
    pub async fn list_episode_ids(&self) -> CastosResult<Vec<u64>> {
        let url = self.episodes_url();
        tracing::debug!("Listing episodes: {}", Self::redacted(&url));

        let response = http_client()
            .get(&url)
            .send()
            .await
            .map_err(|source| CastosError::Http {
                url: Self::redacted(&url),
                source,
            })?;
        let episodes: Vec<EpisodeListPayload> =
            handle_response(&Self::redacted(&url), response).await?;

        Ok(episodes.into_iter().map(|episode| episode.id).collect())
    }
}

#[async_trait]
impl EpisodeSource for CastosClient {
    async fn get_episode(&self, id: u64) -> CastosResult<EpisodePayload> {
        let url = self.episode_url(id);
        tracing::debug!("Fetching episode: {}", Self::redacted(&url));

        let response = http_client()
            .get(&url)
            .send()
            .await
            .map_err(|source| CastosError::Http {
                url: Self::redacted(&url),
                source,
            })?;

        handle_response(&Self::redacted(&url), response).await
    }

    async fn update_episode(&self, id: u64, payload: &EpisodeUpdatePayload) -> CastosResult<()> {
        let url = self.episode_url(id);
        tracing::debug!("Updating episode: {}", Self::redacted(&url));

        let response = http_client()
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| CastosError::Http {
                url: Self::redacted(&url),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CastosError::Api {
                url: Self::redacted(&url),
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Checks the status and unwraps the `data` envelope of a response
async fn handle_response<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> CastosResult<T> {
    let status = response.status();
    let body = response.text().await.map_err(|source| CastosError::Http {
        url: url.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(CastosError::Api {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    parse_envelope(url, &body)
}

fn parse_envelope<T: DeserializeOwned>(url: &str, body: &str) -> CastosResult<T> {
    serde_json::from_str::<ApiEnvelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|source| CastosError::Json {
            url: url.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn client() -> CastosClient {
        let config = AppConfig::from_lookup(|key| match key {
            "CASTOS_TOKEN" => Some("s3cr3t&x".to_string()),
            "CASTOS_API_BASE" => Some("https://castos.test/api/v2/".to_string()),
            _ => None,
        })
        .unwrap();
        CastosClient::new(&config)
    }

    #[test]
    fn test_episode_urls() {
        let client = client();
        assert_eq!(
            client.episodes_url(),
            "https://castos.test/api/v2/podcasts/9/episodes?token=s3cr3t%26x"
        );
        assert_eq!(
            client.episode_url(1204),
            "https://castos.test/api/v2/podcasts/9/episodes/1204?token=s3cr3t%26x"
        );
    }

    #[test]
    fn test_redacted_url_hides_token() {
        let url = client().episode_url(5);
        let redacted = CastosClient::redacted(&url);
        assert!(!redacted.contains("s3cr3t"));
        assert!(redacted.ends_with("episodes/5?token=***"));
    }

    #[test]
    fn test_parse_envelope_list() {
        let ids: Vec<EpisodeListPayload> =
            parse_envelope("u", r#"{"data": [{"id": 1}, {"id": 2}]}"#).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_parse_envelope_wrong_shape() {
        let result: CastosResult<Vec<EpisodeListPayload>> =
            parse_envelope("u", r#"{"data": {"id": 1}}"#);
        assert!(matches!(result, Err(CastosError::Json { .. })));

        let result: CastosResult<Vec<EpisodeListPayload>> = parse_envelope("u", r#"[]"#);
        assert!(matches!(result, Err(CastosError::Json { .. })));
    }
}
