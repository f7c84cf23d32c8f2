//! Refresh after write.
//!
//! Ingestion is asynchronous on the backend, so a write is followed by a fixed wait and then a
//! plain re-fetch. There is no polling and no confirmation that the write has landed.

use std::future::Future;
use std::time::Duration;

/// Sleep for `delay`, then run `fetch` once.
pub async fn refresh_after<T, F, Fut>(delay: Duration, fetch: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    if !delay.is_zero() {
        tracing::debug!("waiting {:?} before refreshing", delay);
        tokio::time::sleep(delay).await;
    }
    fetch().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn waits_then_fetches_once() {
        let mut calls = 0;
        let started = Instant::now();

        let value = refresh_after(Duration::from_millis(20), || {
            calls += 1;
            async { 42 }
        })
        .await;

        assert_eq!(value, 42);
        assert_eq!(calls, 1);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn zero_delay_fetches_immediately() {
        let value = refresh_after(Duration::ZERO, || async { "fresh" }).await;
        assert_eq!(value, "fresh");
    }
}
