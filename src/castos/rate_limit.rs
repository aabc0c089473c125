use anyhow::{Context, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps in-flight requests and enforces a minimum spacing between request starts
#[derive(Clone)]
pub struct RequestThrottle {
    permits: Arc<Semaphore>,
    spacing: Option<Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
}

impl RequestThrottle {
    /// `max_concurrent` is clamped to at least 1. A zero `min_interval` disables spacing.
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        let spacing = Quota::with_period(min_interval)
            .map(|quota| quota.allow_burst(NonZeroU32::MIN))
            .map(|quota| Arc::new(RateLimiter::direct(quota)));

        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            spacing,
        }
    }

    /// Waits for a free slot and for the spacing window. Hold the permit for the
    /// duration of the request.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .context("Request semaphore closed")?;

        if let Some(limiter) = &self.spacing {
            limiter.until_ready().await;
        }

        Ok(permit)
    }
}
