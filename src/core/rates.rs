//! Exchange rate snapshots and load state

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub id: String,
    pub code: String,
    pub num_code: String,
    pub name: String,
    pub nominal: u32,
    pub value: Decimal,
}

impl RateEntry {
    /// Rate for a single unit of the currency.
    pub fn unit_rate(&self) -> Decimal {
        self.value / Decimal::from(self.nominal)
    }
}

/// A complete set of rates as of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub entries: Vec<RateEntry>,
    pub as_of: Option<NaiveDate>,
    pub source_name: Option<String>,
}

impl RateSnapshot {
    pub fn find(&self, code: &str) -> Option<&RateEntry> {
        self.entries
            .iter()
            .find(|entry| entry.code.eq_ignore_ascii_case(code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::NotLoaded)
    }
}

impl Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::NotLoaded => write!(f, "not loaded"),
            LoadState::Loaded => write!(f, "loaded"),
            LoadState::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}
