pub mod filename_date;
pub mod mapper;
pub mod renumber;

use anyhow::Result;
use chrono::FixedOffset;

use crate::castos::models::EpisodePayload;

pub use mapper::map_episodes;
pub use renumber::{format_post_date, renumber_episodes};

/// Maps, sorts and renumbers a full batch of fetched episodes
///
/// Returns the episodes in publish order with their new numbers and titles.
pub fn process_episodes(
    episodes: &[EpisodePayload],
    offset: FixedOffset,
    base_number: u32,
) -> Result<Vec<models::MappedEpisode>> {
    let mapped = map_episodes(episodes, offset)?;
    Ok(renumber_episodes(mapped, base_number))
}

/// Data models for the renumbering pipeline
pub mod models {
    use chrono::{DateTime, FixedOffset};

    /// An episode reduced to the fields the renumbering rewrites
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MappedEpisode {
        pub id: u64,
        pub post_title: String,
        pub post_date: DateTime<FixedOffset>,
        pub episode_number: String,
    }
}
