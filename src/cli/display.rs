//! Terminal view over a [`RateClient`]
//!
//! The display only reacts to the client's streams: it owns no rate state of
//! its own. Activation subscribes and starts polling, deactivation stops the
//! client and clears the spinner.

use super::ui;
use crate::client::{ClientError, RateClient};
use crate::core::config::AppConfig;
use crate::core::LoadState;
use indicatif::ProgressBar;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const LOADING_MESSAGE: &str = "Loading exchange rates...";

/// Spinner shown while the client reports `NotLoaded`.
#[derive(Clone, Default)]
pub struct LoadingIndicator {
    spinner: Arc<Mutex<Option<ProgressBar>>>,
}

impl LoadingIndicator {
    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.spinner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show(&self) {
        let mut slot = self.slot();
        if slot.is_none() {
            *slot = Some(ui::new_spinner(LOADING_MESSAGE));
        }
    }

    pub fn hide(&self) {
        if let Some(spinner) = self.slot().take() {
            spinner.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.slot().is_some()
    }

    /// Runs `f` with the spinner hidden so printed output is not mangled.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match self.slot().as_ref() {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

pub struct RateDisplay {
    client: RateClient,
    indicator: LoadingIndicator,
    config: Arc<AppConfig>,
}

impl RateDisplay {
    pub fn new(client: RateClient, config: &AppConfig) -> Self {
        Self {
            client,
            indicator: LoadingIndicator::default(),
            config: Arc::new(config.clone()),
        }
    }

    pub fn activate(&mut self) -> Result<(), ClientError> {
        let indicator = self.indicator.clone();
        self.client.on_load_state_changed(move |state| match state {
            LoadState::NotLoaded => indicator.show(),
            LoadState::Loaded | LoadState::Failed(_) => indicator.hide(),
        });

        let indicator = self.indicator.clone();
        let config = Arc::clone(&self.config);
        self.client.on_rates_changed(move |rates| {
            if let Some(snapshot) = rates {
                let table = ui::rates_table(snapshot, |code| config.shows(code));
                indicator.suspend(|| println!("{table}"));
            }
        });

        let indicator = self.indicator.clone();
        self.client.on_error_message_changed(move |message| {
            if let Some(message) = message {
                let text = ui::style_text(message, ui::StyleType::Error);
                indicator.suspend(|| eprintln!("{text}"));
            }
        });

        self.client.start()
    }

    pub fn deactivate(&mut self) {
        self.client.stop();
        self.indicator.hide();
    }

    pub fn client(&self) -> &RateClient {
        &self.client
    }

    pub fn indicator(&self) -> &LoadingIndicator {
        &self.indicator
    }
}

impl Drop for RateDisplay {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::PollSchedule;
    use crate::core::{FetchError, RateSnapshot, RateSource, SourceKind};
    use crate::providers::fixtures::DAILY_XML;
    use crate::providers::xml_daily::parse_daily_xml;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticSource;

    #[async_trait]
    impl RateSource for StaticSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Primary
        }

        async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError> {
            parse_daily_xml(DAILY_XML)
        }
    }

    fn display() -> RateDisplay {
        let schedule = PollSchedule::new(Duration::from_secs(60), Duration::from_secs(60)).unwrap();
        let client = RateClient::new(Arc::new(StaticSource), Arc::new(StaticSource))
            .with_schedule(schedule);
        let config = AppConfig {
            currencies: vec!["USD".to_string()],
            ..AppConfig::default()
        };
        RateDisplay::new(client, &config)
    }

    #[tokio::test]
    async fn test_activation_shows_spinner_until_loaded() {
        let mut display = display();

        display.activate().unwrap();
        assert!(display.client().is_running());
        assert!(display.indicator().is_visible());

        display.client().run_tick().await;
        assert!(!display.indicator().is_visible());
        assert_eq!(display.client().rates().map(|r| r.len()), Some(3));

        display.deactivate();
        assert!(!display.client().is_running());
    }

    #[tokio::test]
    async fn test_activation_after_deactivation_fails() {
        let mut display = display();
        display.activate().unwrap();
        display.deactivate();

        assert_eq!(display.activate(), Err(ClientError::Stopped));
        assert!(!display.indicator().is_visible());
    }

    #[test]
    fn test_indicator_show_hide_is_idempotent() {
        let indicator = LoadingIndicator::default();
        indicator.show();
        indicator.show();
        assert!(indicator.is_visible());

        indicator.hide();
        indicator.hide();
        assert!(!indicator.is_visible());
    }
}
