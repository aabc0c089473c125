//! Fetches full episode records for a list of ids
//!
//! Cached episodes are resolved straight from disk. Everything else is fetched
//! through the request throttle, cached, and collected once every task has
//! finished. A failed episode does not stop the others; failures are reported
//! alongside the episodes that did arrive.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

use super::cache::EpisodeCache;
use super::models::EpisodePayload;
use super::rate_limit::RequestThrottle;
use super::EpisodeSource;

/// An episode that could not be fetched or cached
#[derive(Debug)]
pub struct FetchFailure {
    pub id: u64,
    pub error: anyhow::Error,
}

/// Outcome of a fetch run
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Fetched episodes, in the order their ids were requested
    pub episodes: Vec<EpisodePayload>,
    pub failures: Vec<FetchFailure>,
    /// How many episodes were served from the cache
    pub cache_hits: usize,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetches every id, serving cache hits without touching the network
pub async fn fetch_episodes<S>(
    source: Arc<S>,
    cache: &EpisodeCache,
    throttle: &RequestThrottle,
    ids: &[u64],
) -> FetchReport
where
    S: EpisodeSource + 'static,
{
    let mut slots: Vec<Option<Result<EpisodePayload>>> = Vec::with_capacity(ids.len());
    let mut tasks = JoinSet::new();
    let mut cache_hits = 0usize;

    for (index, &id) in ids.iter().enumerate() {
        match cache.read(id).await {
            Ok(Some(episode)) => {
                tracing::debug!("Cache hit for episode {}", id);
                tracing::info!("fetched episode {}", id);
                cache_hits += 1;
                slots.push(Some(Ok(episode)));
            }
            Ok(None) => {
                slots.push(None);
                let source = Arc::clone(&source);
                let cache = cache.clone();
                let throttle = throttle.clone();
                tasks.spawn(async move {
                    let result = fetch_and_cache(&*source, &cache, &throttle, id).await;
                    (index, result)
                });
            }
            Err(e) => slots.push(Some(Err(e))),
        }
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                if let Ok(episode) = &result {
                    tracing::info!("fetched episode {}", episode.id);
                }
                slots[index] = Some(result);
            }
            // slot stays empty and is reported below
            Err(e) => tracing::error!("Episode fetch task aborted: {}", e),
        }
    }

    let mut report = FetchReport {
        cache_hits,
        ..Default::default()
    };
    for (slot, &id) in slots.into_iter().zip(ids) {
        match slot {
            Some(Ok(episode)) => report.episodes.push(episode),
            Some(Err(error)) => {
                tracing::warn!("Failed to fetch episode {}: {:#}", id, error);
                report.failures.push(FetchFailure { id, error });
            }
            None => report.failures.push(FetchFailure {
                id,
                error: anyhow!("fetch task for episode {} did not complete", id),
            }),
        }
    }

    report
}

async fn fetch_and_cache<S>(
    source: &S,
    cache: &EpisodeCache,
    throttle: &RequestThrottle,
    id: u64,
) -> Result<EpisodePayload>
where
    S: EpisodeSource + ?Sized,
{
    let _permit = throttle.acquire().await?;
    let episode = source.get_episode(id).await?;
    cache.write(id, &episode).await?;
    Ok(episode)
}
