mod castos;
mod config;
mod episodes;

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use castos::cache::EpisodeCache;
use castos::fetcher::fetch_episodes;
use castos::rate_limit::RequestThrottle;
use castos::updater::push_updates;
use castos::CastosClient;
use config::AppConfig;
use episodes::{format_post_date, process_episodes};

#[tokio::main]
async fn main() -> Result<()> {
    // Use RUST_LOG if set, otherwise info
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    run(&config).await
}

/// Fetch, renumber and optionally push back every episode of the podcast
async fn run(config: &AppConfig) -> Result<()> {
    let client = Arc::new(CastosClient::new(config));
    let cache = EpisodeCache::new(&config.cache_dir);
    let throttle = RequestThrottle::new(config.max_concurrent, config.min_interval);

    let ids = {
        let _permit = throttle.acquire().await?;
        client
            .list_episode_ids()
            .await
            .context("Failed to list podcast episodes")?
    };
    tracing::info!("Podcast {} has {} episode(s)", config.podcast_id, ids.len());

    let report = fetch_episodes(client.clone(), &cache, &throttle, &ids).await;
    tracing::info!(
        "Fetched {} episode(s), {} from cache",
        report.episodes.len(),
        report.cache_hits
    );

    if !report.is_complete() {
        for failure in &report.failures {
            tracing::error!("Episode {}: {:#}", failure.id, failure.error);
        }
        bail!(
            "{} of {} episode(s) could not be fetched; rerun to retry them",
            report.failures.len(),
            ids.len()
        );
    }

    let renumbered = process_episodes(
        &report.episodes,
        config.utc_offset,
        config.base_episode_number,
    )?;

    for episode in &renumbered {
        tracing::info!(
            "{} | #{} | {} | {}",
            episode.id,
            episode.episode_number,
            format_post_date(&episode.post_date),
            episode.post_title
        );
    }

    if !config.push_updates {
        tracing::info!("PUSH_UPDATES is off, {} episode(s) left unchanged", renumbered.len());
        return Ok(());
    }

    let update_report = push_updates(client, &throttle, &renumbered).await;
    tracing::info!("Updated {} episode(s)", update_report.updated.len());

    if !update_report.failures.is_empty() {
        for (id, error) in &update_report.failures {
            tracing::error!("Episode {}: {:#}", id, error);
        }
        bail!(
            "{} of {} episode update(s) failed",
            update_report.failures.len(),
            renumbered.len()
        );
    }

    Ok(())
}
