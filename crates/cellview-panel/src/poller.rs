//! Screenshot refresh polling
//!
//! One cycle asks the server to capture a screenshot, publishes the new
//! cache-busting address, then waits for the host to report that the image
//! finished loading before starting the next cycle.
//!
//! Failure handling:
//! - request timeout: show "Poor network connection", retry after
//!   `retry_interval * timeout_backoff`, indefinitely
//! - other transport failure: alert and stop
//! - server reports failure: show its message, keep going
//! - image never loads: alert after `load_check_limit` waits and stop

use cellview_communication::{screen_url, ScreenApi};
use cellview_core::constants::{
    LOAD_CHECK_INTERVAL_MS, LOAD_CHECK_LIMIT, MSG_CHECK_NETWORK, MSG_CONNECTION_FAILED,
    MSG_POOR_NETWORK, MSG_REFRESH_FAILED, RETRY_INTERVAL_MS, TIMEOUT_BACKOFF,
};
use cellview_core::{EventDispatcher, PanelError, PanelEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Poller timings
#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    /// Delay before the next cycle once an image has loaded
    pub retry_interval: Duration,
    /// Multiplier on `retry_interval` after a request timeout
    pub timeout_backoff: f64,
    /// Waits allowed for an image to finish loading
    pub load_check_limit: u32,
    /// Spacing between load checks
    pub load_check_interval: Duration,
}

impl PollerConfig {
    /// Delay before retrying a timed out refresh
    ///
    /// Saturates instead of panicking; [`validate`](Self::validate) rejects
    /// timings that would saturate.
    pub fn timeout_retry_delay(&self) -> Duration {
        self.checked_retry_delay().unwrap_or(Duration::MAX)
    }

    /// Longest time the poller waits for one image
    pub fn load_wait_budget(&self) -> Duration {
        self.load_check_interval
            .checked_mul(self.load_check_limit)
            .unwrap_or(Duration::MAX)
    }

    /// Check that every derived delay is representable
    pub fn validate(&self) -> Result<(), PanelError> {
        if !(self.timeout_backoff.is_finite() && self.timeout_backoff >= 1.0) {
            return Err(PanelError::InvalidTiming {
                what: "timeout_backoff",
                reason: format!("{} is not a finite factor of at least 1", self.timeout_backoff),
            });
        }
        if self.checked_retry_delay().is_none() {
            return Err(PanelError::InvalidTiming {
                what: "retry_interval",
                reason: format!(
                    "{:?} x {} overflows",
                    self.retry_interval, self.timeout_backoff
                ),
            });
        }
        if self
            .load_check_interval
            .checked_mul(self.load_check_limit)
            .is_none()
        {
            return Err(PanelError::InvalidTiming {
                what: "load_check_interval",
                reason: format!(
                    "{:?} x {} checks overflows",
                    self.load_check_interval, self.load_check_limit
                ),
            });
        }
        Ok(())
    }

    fn checked_retry_delay(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.retry_interval.as_secs_f64() * self.timeout_backoff).ok()
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(RETRY_INTERVAL_MS),
            timeout_backoff: TIMEOUT_BACKOFF,
            load_check_limit: LOAD_CHECK_LIMIT,
            load_check_interval: Duration::from_millis(LOAD_CHECK_INTERVAL_MS),
        }
    }
}

/// "Image finished loading" flag shared with the host
///
/// The host calls [`complete`](Self::complete) from its image element's
/// load handler; the poller consumes it with [`take`](Self::take).
#[derive(Debug, Clone, Default)]
pub struct LoadSignal(Arc<AtomicBool>);

impl LoadSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the current screenshot as loaded
    pub fn complete(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one refresh request
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A new screenshot is available at `url`
    Refreshed { url: String },
    /// The server answered but could not capture a screenshot
    Rejected { message: String },
    /// The request exceeded its deadline
    TimedOut,
    /// The request failed for any other reason
    Failed(String),
}

/// Result of waiting for a screenshot to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadWait {
    Completed,
    Exhausted,
}

/// Why [`ScreenPoller::run`] returned
#[derive(Debug, Clone, PartialEq)]
pub enum PollerStop {
    /// A refresh request failed with a non-timeout error
    TransportFailure(String),
    /// No image finished loading within the wait budget
    LoadStalled,
}

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Screenshot refresh loop
pub struct ScreenPoller<A: ScreenApi> {
    api: A,
    events: EventDispatcher,
    load: LoadSignal,
    config: PollerConfig,
    clock: Clock,
}

impl<A: ScreenApi> ScreenPoller<A> {
    /// Create a poller, rejecting timings that cannot be scheduled
    pub fn new(
        api: A,
        events: EventDispatcher,
        load: LoadSignal,
        config: PollerConfig,
    ) -> Result<Self, PanelError> {
        config.validate()?;
        Ok(Self {
            api,
            events,
            load,
            config,
            clock: Box::new(|| chrono::Utc::now().timestamp_millis()),
        })
    }

    /// Replace the millisecond clock used for cache-busting addresses
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn load_signal(&self) -> &LoadSignal {
        &self.load
    }

    /// Issue one refresh request and publish its outcome
    pub async fn refresh_once(&self) -> RefreshOutcome {
        match self.api.refresh_screen().await {
            Ok(response) if response.success => {
                let url = screen_url((self.clock)());
                tracing::debug!("Screenshot refreshed: {}", url);
                self.events.publish(PanelEvent::clear_info());
                self.events
                    .publish(PanelEvent::ScreenUpdated { url: url.clone() });
                RefreshOutcome::Refreshed { url }
            }
            Ok(response) => {
                tracing::warn!("Screenshot refresh rejected: {}", response.data);
                self.events.publish(PanelEvent::Info(format!(
                    "{}{}",
                    MSG_REFRESH_FAILED, response.data
                )));
                RefreshOutcome::Rejected {
                    message: response.data,
                }
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("Screenshot refresh timed out: {}", e);
                self.events
                    .publish(PanelEvent::Info(MSG_POOR_NETWORK.to_string()));
                RefreshOutcome::TimedOut
            }
            Err(e) => {
                tracing::error!("Screenshot refresh failed: {}", e);
                self.events
                    .publish(PanelEvent::Alert(MSG_CONNECTION_FAILED.to_string()));
                RefreshOutcome::Failed(e.to_string())
            }
        }
    }

    /// Wait for the host to report the screenshot as loaded
    ///
    /// Checks the load flag, then up to `load_check_limit` more times after
    /// each `load_check_interval`. Alerts when the budget runs out.
    pub async fn wait_for_load(&self) -> LoadWait {
        let mut remaining = self.config.load_check_limit;
        loop {
            if self.load.take() {
                return LoadWait::Completed;
            }
            if remaining == 0 {
                tracing::warn!(
                    "Screenshot did not load after {} checks",
                    self.config.load_check_limit
                );
                self.events
                    .publish(PanelEvent::Alert(MSG_CHECK_NETWORK.to_string()));
                return LoadWait::Exhausted;
            }
            tracing::debug!("image load waiting: {}", remaining);
            tokio::time::sleep(self.config.load_check_interval).await;
            remaining -= 1;
        }
    }

    /// Poll until a non-recoverable condition stops the loop
    pub async fn run(&self) -> PollerStop {
        tracing::info!("Screen poller started");
        loop {
            match self.refresh_once().await {
                RefreshOutcome::TimedOut => {
                    tokio::time::sleep(self.config.timeout_retry_delay()).await;
                    continue;
                }
                RefreshOutcome::Failed(reason) => {
                    return PollerStop::TransportFailure(reason);
                }
                RefreshOutcome::Refreshed { .. } | RefreshOutcome::Rejected { .. } => {}
            }

            match self.wait_for_load().await {
                LoadWait::Completed => tokio::time::sleep(self.config.retry_interval).await,
                LoadWait::Exhausted => return PollerStop::LoadStalled,
            }
        }
    }
}
