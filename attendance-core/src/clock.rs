//! Clock skew correction and the once-per-second ticker.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::PortalResult;
use crate::store::TrustedClock;

/// This machine's clock, served to clients as the trusted time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl TrustedClock for SystemClock {
    async fn now(&self) -> PortalResult<DateTime<Utc>> {
        Ok(Utc::now())
    }
}

/// Local clock corrected by a one-time offset from a trusted source.
///
/// The offset is measured once and never refreshed; drift after that is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSync {
    offset: Duration,
}

impl Default for TimeSync {
    fn default() -> Self {
        Self::local()
    }
}

impl TimeSync {
    /// No correction, plain local time.
    pub fn local() -> Self {
        TimeSync {
            offset: Duration::zero(),
        }
    }

    pub fn with_offset_millis(millis: i64) -> Self {
        TimeSync {
            offset: Duration::milliseconds(millis),
        }
    }

    /// Measure the offset between `source` and the local clock.
    ///
    /// If the source can't be reached the local clock is used as is. The
    /// failure is logged and never returned.
    pub async fn sync<C>(source: &C) -> Self
    where
        C: TrustedClock + ?Sized,
    {
        match source.now().await {
            Ok(trusted) => {
                let sync = TimeSync {
                    offset: trusted - Utc::now(),
                };
                debug!(offset_ms = sync.offset_millis(), "synced with trusted clock");
                sync
            }
            Err(e) => {
                warn!(error = %e, "could not sync with server time, using local clock");
                Self::local()
            }
        }
    }

    pub fn offset_millis(&self) -> i64 {
        self.offset.num_milliseconds()
    }

    /// Current corrected time.
    pub fn now(&self) -> DateTime<Utc> {
        self.at(Utc::now())
    }

    /// Correct a local instant.
    pub fn at(&self, local: DateTime<Utc>) -> DateTime<Utc> {
        local + self.offset
    }
}

/// A repeating timer bound to the lifetime of this handle.
///
/// The background task is aborted when the handle is dropped, so the callback
/// can't fire after whatever owns the ticker has gone away.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub const EVERY_SECOND: StdDuration = StdDuration::from_secs(1);

    /// Start calling `on_tick` every `period`, the first time immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: StdDuration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        });

        Ticker { handle }
    }

    /// Stop ticking now. Equivalent to dropping the handle.
    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortalError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AheadClock(Duration);

    #[async_trait]
    impl TrustedClock for AheadClock {
        async fn now(&self) -> PortalResult<DateTime<Utc>> {
            Ok(Utc::now() + self.0)
        }
    }

    struct BrokenClock;

    #[async_trait]
    impl TrustedClock for BrokenClock {
        async fn now(&self) -> PortalResult<DateTime<Utc>> {
            Err(PortalError::TimeSourceUnavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_sync_measures_offset() {
        let sync = TimeSync::sync(&AheadClock(Duration::hours(1))).await;
        let offset = sync.offset_millis();
        assert!((3_599_000..=3_601_000).contains(&offset), "offset was {offset}");
    }

    #[tokio::test]
    async fn test_sync_falls_back_to_local_clock() {
        let sync = TimeSync::sync(&BrokenClock).await;
        assert_eq!(sync, TimeSync::local());
        assert_eq!(sync.offset_millis(), 0);
    }

    #[test]
    fn test_at_applies_offset() {
        let sync = TimeSync::with_offset_millis(-2_500);
        let local = DateTime::parse_from_rfc3339("2025-01-01T00:00:10Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(sync.at(local).to_rfc3339(), "2025-01-01T00:00:07.500+00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_after_drop() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let ticker = Ticker::spawn(Ticker::EVERY_SECOND, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(ticker.is_running());

        tokio::time::sleep(StdDuration::from_millis(2_500)).await;
        let before = ticks.load(Ordering::SeqCst);
        assert!(before >= 2, "expected at least two ticks, got {before}");

        ticker.stop();
        tokio::time::sleep(StdDuration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), before);
    }
}
