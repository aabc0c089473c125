//! Flat on-disk cache of fetched episodes, one JSON file per episode id
//!
//! Entries are never expired. Delete the directory to force a refetch.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::models::EpisodePayload;

#[derive(Debug, Clone)]
pub struct EpisodeCache {
    dir: PathBuf,
}

impl EpisodeCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the cache file for an episode id
    pub fn path_for(&self, id: u64) -> PathBuf {
        self.dir.join(format!("episode_{}.json", id))
    }

    /// Reads a cached episode, `None` when nothing is cached for `id`
    pub async fn read(&self, id: u64) -> Result<Option<EpisodePayload>> {
        let path = self.path_for(id);
        if !exists(&path).await? {
            return Ok(None);
        }

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read cache file {}", path.display()))?;
        let episode = serde_json::from_slice(&bytes)
            .with_context(|| format!("Corrupt cache file {}", path.display()))?;

        Ok(Some(episode))
    }

    /// Writes an episode under the id it was requested with, creating the
    /// directory if needed
    pub async fn write(&self, id: u64, episode: &EpisodePayload) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create cache dir {}", self.dir.display()))?;

        let path = self.path_for(id);
        let json = serde_json::to_vec_pretty(episode).context("Failed to serialize episode")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;

        Ok(())
    }
}

async fn exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to stat cache file {}", path.display()))
}
