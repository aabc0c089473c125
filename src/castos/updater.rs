use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;

use super::models::EpisodeUpdatePayload;
use super::rate_limit::RequestThrottle;
use super::EpisodeSource;
use crate::episodes::format_post_date;
use crate::episodes::models::MappedEpisode;

/// Outcome of pushing renumbered episodes back to Castos
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub updated: Vec<u64>,
    pub failures: Vec<(u64, anyhow::Error)>,
}

/// Builds the update body for a renumbered episode
pub fn update_payload(episode: &MappedEpisode) -> EpisodeUpdatePayload {
    EpisodeUpdatePayload {
        post_title: Some(episode.post_title.clone()),
        episode_number: Some(episode.episode_number.clone()),
        post_date: Some(format_post_date(&episode.post_date)),
    }
}

/// Pushes title, episode number and post date of every episode
pub async fn push_updates<S>(
    source: Arc<S>,
    throttle: &RequestThrottle,
    episodes: &[MappedEpisode],
) -> UpdateReport
where
    S: EpisodeSource + 'static,
{
    let mut tasks = JoinSet::new();
    for episode in episodes {
        let id = episode.id;
        let payload = update_payload(episode);
        let source = Arc::clone(&source);
        let throttle = throttle.clone();
        tasks.spawn(async move {
            let result: Result<()> = async {
                let _permit = throttle.acquire().await?;
                source.update_episode(id, &payload).await?;
                Ok(())
            }
            .await;
            (id, result)
        });
    }

    let mut report = UpdateReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((id, Ok(()))) => {
                tracing::info!("updated episode {}", id);
                report.updated.push(id);
            }
            Ok((id, Err(e))) => {
                tracing::warn!("Failed to update episode {}: {:#}", id, e);
                report.failures.push((id, e));
            }
            Err(e) => tracing::error!("Episode update task aborted: {}", e),
        }
    }

    // tasks that never reported back
    for episode in episodes {
        let reported = report.updated.contains(&episode.id)
            || report.failures.iter().any(|(id, _)| *id == episode.id);
        if !reported {
            report.failures.push((
                episode.id,
                anyhow::anyhow!("update task for episode {} did not complete", episode.id),
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castos::fetcher::tests::FakeSource;
    use chrono::{FixedOffset, TimeZone};
    use std::time::Duration;

    fn mapped(id: u64, number: u32) -> MappedEpisode {
        let cst = FixedOffset::west_opt(6 * 3600).unwrap();
        MappedEpisode {
            id,
            post_title: format!("Episode {}: Title", number),
            post_date: cst.with_ymd_and_hms(2020, 3, 2, 10, 0, 0).unwrap(),
            episode_number: number.to_string(),
        }
    }

    #[test]
    fn test_update_payload() {
        let payload = update_payload(&mapped(1, 339));
        assert_eq!(payload.post_title.as_deref(), Some("Episode 339: Title"));
        assert_eq!(payload.episode_number.as_deref(), Some("339"));
        assert_eq!(payload.post_date.as_deref(), Some("2020-03-02 10:00:00"));
    }

    #[tokio::test]
    async fn test_push_updates() {
        let source = Arc::new(FakeSource::failing(&[2]));
        let throttle = RequestThrottle::new(1, Duration::ZERO);
        let episodes = vec![mapped(1, 339), mapped(2, 340), mapped(3, 341)];

        let mut report = push_updates(source.clone(), &throttle, &episodes).await;

        report.updated.sort();
        assert_eq!(report.updated, vec![1, 3]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 2);

        let updated = source.updated.lock().unwrap();
        let numbers: Vec<Option<String>> = updated
            .iter()
            .map(|(_, payload)| payload.episode_number.clone())
            .collect();
        assert!(numbers.contains(&Some("341".to_string())));
    }
}
