//! Rate source abstractions and fetch errors

use crate::core::rates::RateSnapshot;
use async_trait::async_trait;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Primary,
    Alternative,
}

impl Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SourceKind::Primary => "primary",
                SourceKind::Alternative => "alternative",
            }
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Network or HTTP status failure. Retried.
    #[error("transport error: {0}")]
    Transport(String),
    /// Malformed payload. Never retried.
    #[error("parse error: {0}")]
    Parse(String),
    #[error("all sources failed (primary: {primary}; alternative: {alternative})")]
    ExhaustedFallback {
        primary: Box<FetchError>,
        alternative: Box<FetchError>,
    },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    TransientFailure,
    TerminalFailure,
}

/// One request against a source, recorded for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchAttempt {
    pub source: SourceKind,
    pub attempt: usize,
    pub outcome: AttemptOutcome,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    async fn fetch_snapshot(&self) -> Result<RateSnapshot, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_transient() {
        assert!(FetchError::Transport("timeout".into()).is_transient());
        assert!(!FetchError::Parse("bad xml".into()).is_transient());
        let exhausted = FetchError::ExhaustedFallback {
            primary: Box::new(FetchError::Transport("a".into())),
            alternative: Box::new(FetchError::Transport("b".into())),
        };
        assert!(!exhausted.is_transient());
        assert_eq!(
            exhausted.to_string(),
            "all sources failed (primary: transport error: a; alternative: transport error: b)"
        );
    }
}
