//! Polling exchange rate client
//!
//! [`RateClient`] runs one tick per period: fetch the primary XML feed, fall
//! back to the alternative JSON feed once the primary is exhausted, and
//! publish the outcome on three replay-latest streams. Ticks never overlap and
//! a failing tick never stops the timer.

use crate::core::config::AppConfig;
use crate::core::{FetchError, LoadState, RateSnapshot, RateSource, ReplayLatest};
use crate::providers::http::build_client;
use crate::providers::util::with_retry;
use crate::providers::{JsonDailySource, XmlDailySource};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const INITIAL_DELAY: Duration = Duration::from_secs(4);
pub const POLL_PERIOD: Duration = Duration::from_secs(10);
/// Retries per source after the first attempt.
pub const MAX_RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 0;

pub const FAILED_PARSE_MESSAGE: &str = "Failed parse xml response";
pub const SWITCHING_MESSAGE: &str = "Switching to alternative source";
pub const NOT_AVAILABLE_MESSAGE: &str = "Data is not available at this time...";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("polling has already been started")]
    AlreadyStarted,
    #[error("client has been stopped")]
    Stopped,
    #[error("poll period must be greater than 0")]
    ZeroPollPeriod,
    #[error("polling requires a running tokio runtime")]
    NoRuntime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub initial_delay: Duration,
    pub period: Duration,
}

impl PollSchedule {
    /// # Errors
    /// Returns `ClientError::ZeroPollPeriod` if `period` is zero.
    pub fn new(initial_delay: Duration, period: Duration) -> Result<Self, ClientError> {
        if period.is_zero() {
            return Err(ClientError::ZeroPollPeriod);
        }
        Ok(Self {
            initial_delay,
            period,
        })
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            period: POLL_PERIOD,
        }
    }
}

/// Load state published when a tick ends without new rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureLoadState {
    /// Stop the loading indicator; the error stream carries the failure.
    #[default]
    MarkLoaded,
    /// Publish `LoadState::Failed` with the user-facing message.
    MarkFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Primary,
    Alternative,
    ParseFailed(FetchError),
    Exhausted(FetchError),
    Panicked(String),
}

struct ClientState {
    load_state: ReplayLatest<LoadState>,
    rates: ReplayLatest<Option<Arc<RateSnapshot>>>,
    error_message: ReplayLatest<Option<String>>,
}

impl ClientState {
    fn new() -> Self {
        Self {
            load_state: ReplayLatest::new(LoadState::NotLoaded),
            rates: ReplayLatest::new(None),
            error_message: ReplayLatest::new(None),
        }
    }

    fn close(&self) {
        self.load_state.close();
        self.rates.close();
        self.error_message.close();
    }
}

#[derive(Clone)]
struct Pipeline {
    primary: Arc<dyn RateSource>,
    alternative: Arc<dyn RateSource>,
    failure_load_state: FailureLoadState,
    state: Arc<ClientState>,
    tick_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Pipeline {
    async fn fetch(&self, source: &Arc<dyn RateSource>) -> Result<RateSnapshot, FetchError> {
        with_retry(
            source.kind(),
            || source.fetch_snapshot(),
            MAX_RETRIES,
            RETRY_DELAY_MS,
        )
        .await
    }

    fn publish_snapshot(&self, snapshot: RateSnapshot) {
        self.state.load_state.publish(LoadState::Loaded);
        self.state.rates.publish(Some(Arc::new(snapshot)));
    }

    fn publish_failure(&self, message: &str) {
        self.state.error_message.publish(Some(message.to_string()));
        let load_state = match self.failure_load_state {
            FailureLoadState::MarkLoaded => LoadState::Loaded,
            FailureLoadState::MarkFailed => LoadState::Failed(message.to_string()),
        };
        self.state.load_state.publish(load_state);
    }

    async fn tick(&self) -> TickOutcome {
        let _serialized = self.tick_lock.lock().await;
        self.state.load_state.publish(LoadState::NotLoaded);

        let primary_err = match self.fetch(&self.primary).await {
            Ok(snapshot) => {
                debug!(entries = snapshot.len(), "Loaded rates from primary source");
                self.publish_snapshot(snapshot);
                return TickOutcome::Primary;
            }
            Err(err @ FetchError::Parse(_)) => {
                error!(error = %err, "Failed to parse primary response");
                self.publish_failure(FAILED_PARSE_MESSAGE);
                return TickOutcome::ParseFailed(err);
            }
            Err(err) => err,
        };

        warn!(error = %primary_err, "Primary source is not available, switching to alternative");
        self.state
            .error_message
            .publish(Some(SWITCHING_MESSAGE.to_string()));

        match self.fetch(&self.alternative).await {
            Ok(snapshot) => {
                debug!(entries = snapshot.len(), "Loaded rates from alternative source");
                self.publish_snapshot(snapshot);
                TickOutcome::Alternative
            }
            Err(alternative_err) => {
                let err = FetchError::ExhaustedFallback {
                    primary: Box::new(primary_err),
                    alternative: Box::new(alternative_err),
                };
                error!(error = %err, "Exchange rates are not available");
                self.publish_failure(NOT_AVAILABLE_MESSAGE);
                TickOutcome::Exhausted(err)
            }
        }
    }

    async fn guarded_tick(&self) -> TickOutcome {
        match AssertUnwindSafe(self.tick()).catch_unwind().await {
            Ok(outcome) => {
                debug!(?outcome, "Tick finished");
                outcome
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(panic = %message, "Tick panicked");
                self.publish_failure(NOT_AVAILABLE_MESSAGE);
                TickOutcome::Panicked(message)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub struct RateClient {
    pipeline: Pipeline,
    schedule: PollSchedule,
    task: Option<JoinHandle<()>>,
    stopped: bool,
}

impl RateClient {
    pub fn new(primary: Arc<dyn RateSource>, alternative: Arc<dyn RateSource>) -> Self {
        Self {
            pipeline: Pipeline {
                primary,
                alternative,
                failure_load_state: FailureLoadState::default(),
                state: Arc::new(ClientState::new()),
                tick_lock: Arc::new(tokio::sync::Mutex::new(())),
            },
            schedule: PollSchedule::default(),
            task: None,
            stopped: false,
        }
    }

    /// Builds a client for the configured XML and JSON feeds.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = build_client()?;
        let primary = XmlDailySource::with_client(&config.sources.primary.base_url, http.clone());
        let alternative = JsonDailySource::with_client(&config.sources.alternative.base_url, http);
        Ok(Self::new(Arc::new(primary), Arc::new(alternative)))
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_failure_load_state(mut self, failure_load_state: FailureLoadState) -> Self {
        self.pipeline.failure_load_state = failure_load_state;
        self
    }

    /// Starts polling on the current tokio runtime.
    ///
    /// The first tick runs after the initial delay, later ticks at a fixed
    /// rate. A tick that overruns the period delays the next one instead of
    /// overlapping it.
    ///
    /// # Errors
    /// `ClientError::Stopped` or `ClientError::AlreadyStarted` on misuse, and
    /// `ClientError::NoRuntime` when called outside a tokio runtime.
    pub fn start(&mut self) -> Result<(), ClientError> {
        if self.stopped {
            return Err(ClientError::Stopped);
        }
        if self.task.is_some() {
            return Err(ClientError::AlreadyStarted);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClientError::NoRuntime)?;

        let pipeline = self.pipeline.clone();
        let schedule = self.schedule;
        info!(
            initial_delay = ?schedule.initial_delay,
            period = ?schedule.period,
            "Starting rate polling"
        );
        self.task = Some(runtime.spawn(async move {
            let first_tick = tokio::time::Instant::now() + schedule.initial_delay;
            let mut ticker = tokio::time::interval_at(first_tick, schedule.period);
            loop {
                ticker.tick().await;
                pipeline.guarded_tick().await;
            }
        }));
        Ok(())
    }

    /// Cancels polling and any in-flight tick, and releases all subscribers.
    ///
    /// Nothing is published on any stream once this returns. Must not be
    /// called from inside a subscriber callback.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.pipeline.state.close();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        info!("Rate polling stopped");
    }

    /// Runs a single tick immediately, waiting for any scheduled tick in
    /// progress to finish first.
    pub async fn run_tick(&self) -> TickOutcome {
        self.pipeline.guarded_tick().await
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some() && !self.stopped
    }

    pub fn on_load_state_changed<F>(&self, callback: F)
    where
        F: Fn(&LoadState) + Send + Sync + 'static,
    {
        self.pipeline.state.load_state.subscribe(callback);
    }

    pub fn on_rates_changed<F>(&self, callback: F)
    where
        F: Fn(&Option<Arc<RateSnapshot>>) + Send + Sync + 'static,
    {
        self.pipeline.state.rates.subscribe(callback);
    }

    pub fn on_error_message_changed<F>(&self, callback: F)
    where
        F: Fn(&Option<String>) + Send + Sync + 'static,
    {
        self.pipeline.state.error_message.subscribe(callback);
    }

    pub fn load_state(&self) -> LoadState {
        self.pipeline.state.load_state.latest()
    }

    pub fn rates(&self) -> Option<Arc<RateSnapshot>> {
        self.pipeline.state.rates.latest()
    }

    pub fn error_message(&self) -> Option<String> {
        self.pipeline.state.error_message.latest()
    }
}

impl Drop for RateClient {
    fn drop(&mut self) {
        self.stop();
    }
}
