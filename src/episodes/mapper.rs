use anyhow::{Context, Result};
use chrono::FixedOffset;

use super::filename_date::publish_date_from_filename;
use super::models::MappedEpisode;
use crate::castos::models::EpisodePayload;

/// Maps raw episodes to their renumbering records, one for one and in order.
///
/// The publish date comes from the episode's audio file name. The first file name
/// that cannot be parsed aborts the whole batch.
pub fn map_episodes(
    episodes: &[EpisodePayload],
    offset: FixedOffset,
) -> Result<Vec<MappedEpisode>> {
    episodes
        .iter()
        .map(|episode| map_episode(episode, offset))
        .collect()
}

fn map_episode(episode: &EpisodePayload, offset: FixedOffset) -> Result<MappedEpisode> {
    let file_name = &episode.file.file_name;
    let post_date = publish_date_from_filename(file_name, offset).with_context(|| {
        format!(
            "Failed to derive publish date for episode {} from {:?}",
            episode.id, file_name
        )
    })?;

    Ok(MappedEpisode {
        id: episode.id,
        post_title: episode.post_title.clone(),
        post_date,
        episode_number: episode.episode_number.clone().unwrap_or_default(),
    })
}
