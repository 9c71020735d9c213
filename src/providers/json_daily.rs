use super::http::{build_client, fetch_text};
use crate::core::{FetchError, RateEntry, RateSnapshot, RateSource, SourceKind};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::str::FromStr;
use tracing::{debug, instrument};

pub const JSON_DAILY_PATH: &str = "/daily_json.js";

/// Alternative feed payload. Its dates are not carried into the snapshot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DailyJson {
    #[allow(dead_code)]
    date: Option<String>,
    #[allow(dead_code)]
    previous_date: Option<String>,
    #[allow(dead_code)]
    #[serde(rename = "PreviousURL")]
    previous_url: Option<String>,
    #[allow(dead_code)]
    timestamp: Option<String>,
    /// Currency code to entry, in document order.
    valute: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JsonValute {
    #[serde(rename = "ID")]
    id: String,
    num_code: String,
    char_code: Option<String>,
    nominal: u32,
    name: String,
    value: Number,
    #[allow(dead_code)]
    previous: Option<Number>,
}

fn number_to_decimal(number: &Number) -> Result<Decimal, FetchError> {
    let text = number.to_string();
    let value = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| FetchError::Parse(format!("Invalid rate value: '{text}'")))?;
    if value.is_sign_negative() {
        return Err(FetchError::Parse(format!("Negative rate value: '{text}'")));
    }
    Ok(value)
}

fn convert_entry(key: &str, raw: Value) -> Result<RateEntry, FetchError> {
    let valute: JsonValute = serde_json::from_value(raw)
        .map_err(|e| FetchError::Parse(format!("Invalid entry for {key}: {e}")))?;
    if valute.nominal == 0 {
        return Err(FetchError::Parse(format!("Invalid nominal for {key}: 0")));
    }

    Ok(RateEntry {
        value: number_to_decimal(&valute.value)?,
        id: valute.id,
        code: valute.char_code.unwrap_or_else(|| key.to_string()),
        num_code: valute.num_code,
        name: valute.name,
        nominal: valute.nominal,
    })
}

/// Parses the alternative JSON payload, flattening its code to entry mapping
/// into the entry list shape of the primary feed.
pub fn parse_daily_json(body: &str) -> Result<RateSnapshot, FetchError> {
    let doc: DailyJson = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Failed to parse JSON response: {e}")))?;

    let valute = doc
        .valute
        .ok_or_else(|| FetchError::Parse("JSON response has no Valute mapping".to_string()))?;

    let entries = valute
        .into_iter()
        .map(|(key, raw)| convert_entry(&key, raw))
        .collect::<Result<Vec<_>, FetchError>>()?;

    if entries.is_empty() {
        return Err(FetchError::Parse(
            "JSON response contains no currency entries".to_string(),
        ));
    }

    Ok(RateSnapshot {
        entries,
        as_of: None,
        source_name: None,
    })
}

/// Alternative source: the daily rates JSON document.
pub struct JsonDailySource {
    url: String,
    client: Client,
}

impl JsonDailySource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self::with_client(base_url, build_client()?))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        JsonDailySource {
            url: format!("{}{}", base_url.trim_end_matches('/'), JSON_DAILY_PATH),
            client,
        }
    }
}

#[async_trait]
impl RateSource for JsonDailySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Alternative
    }

    #[instrument(name = "JsonDailyFetch", skip(self), fields(url = %self.url))]
    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError> {
        let body = fetch_text(&self.client, &self.url).await?;
        let snapshot = parse_daily_json(&body)?;
        debug!(entries = snapshot.len(), "Parsed JSON rates");
        Ok(snapshot)
    }
}
