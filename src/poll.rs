use std::{future::Future, time::Duration};

use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::error::Error;

/// Calls `fetch` every `interval` until it yields `Some`, giving up with
/// [`Error::Timeout`] once `timeout` has elapsed. Fetch errors end the loop.
pub async fn poll_until<T, F, Fut>(
    timeout: Duration,
    interval: Duration,
    mut fetch: F,
) -> eyre::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = eyre::Result<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = fetch().await? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(Error::Timeout(timeout).into());
        }
        trace!(remaining = ?(deadline - now), "not ready, polling again");
        sleep(interval.min(deadline - now)).await;
    }
}
