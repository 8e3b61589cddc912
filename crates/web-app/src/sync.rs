use std::pin::pin;

use futures_util::{Stream, StreamExt};
use gloo_timers::future::IntervalStream;
use log::{debug, info};
use minigym_domain::ReadError;

/// Repository whose content can change outside of the application.
#[allow(async_fn_in_trait)]
pub trait Refresh {
    /// Fetch the current content and notify subscribers if it changed.
    ///
    /// Returns `true` if a change was observed.
    async fn refresh(&self) -> Result<bool, ReadError>;
}

#[must_use]
pub fn interval(period_ms: u32) -> IntervalStream {
    IntervalStream::new(period_ms)
}

/// Refresh the repository on every tick until the ticks end.
pub async fn poll<R, S>(repository: &R, ticks: S)
where
    R: Refresh,
    S: Stream<Item = ()>,
{
    let mut ticks = pin!(ticks);
    while ticks.next().await.is_some() {
        match repository.refresh().await {
            Ok(true) => info!("received remote changes"),
            Ok(false) => {}
            Err(err) => debug!("failed to refresh: {err}"),
        }
    }
}
