use super::http::{build_client, fetch_text};
use super::util::{parse_nominal, parse_rate_value};
use crate::core::{FetchError, RateEntry, RateSnapshot, RateSource, SourceKind};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const XML_DAILY_PATH: &str = "/daily_utf8.xml";

const DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Deserialize)]
struct ValCurs {
    #[serde(rename = "@Date")]
    date: Option<String>,
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "Valute", default)]
    valutes: Vec<XmlValute>,
}

#[derive(Debug, Deserialize)]
struct XmlValute {
    #[serde(rename = "@ID")]
    id: String,
    #[serde(rename = "NumCode")]
    num_code: String,
    #[serde(rename = "CharCode")]
    char_code: String,
    #[serde(rename = "Nominal")]
    nominal: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Value")]
    value: String,
}

/// Parses the daily XML document into a snapshot.
pub fn parse_daily_xml(body: &str) -> Result<RateSnapshot, FetchError> {
    let doc: ValCurs = quick_xml::de::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Failed to parse XML response: {e}")))?;

    let as_of = doc
        .date
        .as_deref()
        .map(|date| {
            NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
                .map_err(|e| FetchError::Parse(format!("Invalid date '{date}': {e}")))
        })
        .transpose()?;

    let entries = doc
        .valutes
        .into_iter()
        .map(|valute| {
            Ok(RateEntry {
                nominal: parse_nominal(&valute.nominal)?,
                value: parse_rate_value(&valute.value)?,
                id: valute.id,
                code: valute.char_code.trim().to_string(),
                num_code: valute.num_code.trim().to_string(),
                name: valute.name.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    if entries.is_empty() {
        return Err(FetchError::Parse(
            "XML response contains no currency entries".to_string(),
        ));
    }

    Ok(RateSnapshot {
        entries,
        as_of,
        source_name: doc.name,
    })
}

/// Primary source: the daily rates XML document.
pub struct XmlDailySource {
    url: String,
    client: Client,
}

impl XmlDailySource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self::with_client(base_url, build_client()?))
    }

    pub fn with_client(base_url: &str, client: Client) -> Self {
        XmlDailySource {
            url: format!("{}{}", base_url.trim_end_matches('/'), XML_DAILY_PATH),
            client,
        }
    }
}

#[async_trait]
impl RateSource for XmlDailySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Primary
    }

    #[instrument(name = "XmlDailyFetch", skip(self), fields(url = %self.url))]
    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError> {
        let body = fetch_text(&self.client, &self.url).await?;
        let snapshot = parse_daily_xml(&body)?;
        debug!(entries = snapshot.len(), as_of = ?snapshot.as_of, "Parsed XML rates");
        Ok(snapshot)
    }
}
