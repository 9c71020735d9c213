use super::ui;
use crate::client::{NOT_AVAILABLE_MESSAGE, RateClient};
use crate::core::RateSnapshot;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use tracing::debug;

/// Runs a single tick and renders the resulting snapshot, as a table or as
/// pretty JSON.
pub async fn fetch_report(client: &RateClient, config: &AppConfig, json: bool) -> Result<String> {
    let outcome = client.run_tick().await;
    debug!(?outcome, "One-shot fetch finished");

    let Some(snapshot) = client.rates() else {
        let message = client
            .error_message()
            .unwrap_or_else(|| NOT_AVAILABLE_MESSAGE.to_string());
        anyhow::bail!(message);
    };

    if json {
        let filtered = RateSnapshot {
            entries: snapshot
                .entries
                .iter()
                .filter(|entry| config.shows(&entry.code))
                .cloned()
                .collect(),
            ..(*snapshot).clone()
        };
        serde_json::to_string_pretty(&filtered).context("Failed to serialize rates")
    } else {
        Ok(ui::rates_table(&snapshot, |code| config.shows(code)))
    }
}

pub async fn run(client: RateClient, config: &AppConfig, json: bool) -> Result<()> {
    let report = fetch_report(&client, config, json).await?;
    if let Some(message) = client.error_message() {
        eprintln!("{}", ui::style_text(&message, ui::StyleType::Warning));
    }
    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{SourceConfig, SourcesConfig};
    use crate::providers::fixtures::{DAILY_JSON, DAILY_XML};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, currencies: &[&str]) -> AppConfig {
        let source = SourceConfig {
            base_url: server.uri(),
        };
        AppConfig {
            sources: SourcesConfig {
                primary: source.clone(),
                alternative: source,
            },
            currencies: currencies.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_json_report_is_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/daily_utf8.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DAILY_XML))
            .mount(&server)
            .await;

        let config = config_for(&server, &["usd"]);
        let client = RateClient::from_config(&config).unwrap();
        let report = fetch_report(&client, &config, true).await.unwrap();

        let parsed: RateSnapshot = serde_json::from_str(&report).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].code, "USD");
        assert_eq!(parsed.as_of, chrono::NaiveDate::from_ymd_opt(2026, 10, 17));
        assert!(report.contains("\"value\": \"81.2500\""));
    }

    #[tokio::test]
    async fn test_report_from_alternative_source() {
        console::set_colors_enabled(false);
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/daily_utf8.xml"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/daily_json.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DAILY_JSON))
            .mount(&server)
            .await;

        let config = config_for(&server, &[]);
        let client = RateClient::from_config(&config).unwrap();
        let report = fetch_report(&client, &config, false).await.unwrap();

        assert!(report.contains("Exchange rates (latest)"));
        assert!(report.contains("54.4011"));
    }

    #[tokio::test]
    async fn test_report_fails_when_no_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = config_for(&server, &[]);
        let client = RateClient::from_config(&config).unwrap();
        let err = fetch_report(&client, &config, false).await.unwrap_err();

        assert_eq!(err.to_string(), NOT_AVAILABLE_MESSAGE);
    }
}
