//! Chronological ordering and renumbering of a whole episode batch

use chrono::{DateTime, FixedOffset};

use super::models::MappedEpisode;

/// Format the provider expects for `post_date`
const POST_DATE_FORMAT: &str = "%Y-%m-%d %I:%M:%S";

/// Sorts episodes by publish date and renumbers them starting at `base_number`.
///
/// Equal dates keep their input order. Every title is rewritten to
/// `Episode {n}: {title}` after dropping a single leading space.
pub fn renumber_episodes(
    mut episodes: Vec<MappedEpisode>,
    base_number: u32,
) -> Vec<MappedEpisode> {
    // sort_by_key is stable
    episodes.sort_by_key(|episode| episode.post_date);

    // widened so a base near u32::MAX cannot wrap into reused numbers
    for (number, episode) in (u64::from(base_number)..).zip(episodes.iter_mut()) {
        episode.episode_number = number.to_string();
        episode.post_title = numbered_title(&episode.post_title, number);
    }

    episodes
}

/// Builds `Episode {number}: {title}`, stripping one leading space from `title`
pub fn numbered_title(title: &str, number: u64) -> String {
    let title = title.strip_prefix(' ').unwrap_or(title);
    format!("Episode {}: {}", number, title)
}

/// Renders a publish date as `yyyy-MM-dd hh:mm:ss` in its own offset
pub fn format_post_date(date: &DateTime<FixedOffset>) -> String {
    date.format(POST_DATE_FORMAT).to_string()
}
