use crate::core::{AttemptOutcome, FetchAttempt, FetchError, SourceKind};
use rust_decimal::Decimal;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Retries an async fetch while it fails with a transient error
///
/// # Parameters
/// - `source`: Source being fetched, for diagnostics
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the last error. Non-transient errors are
/// returned immediately.
pub async fn with_retry<F, Fut, T>(
    source: SourceKind,
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(val) => {
                let record = FetchAttempt {
                    source,
                    attempt,
                    outcome: AttemptOutcome::Success,
                };
                debug!(?record, "Fetch attempt succeeded");
                return Ok(val);
            }
            Err(err) => {
                let retry = err.is_transient() && attempt < retries;
                let record = FetchAttempt {
                    source,
                    attempt,
                    outcome: if retry {
                        AttemptOutcome::TransientFailure
                    } else {
                        AttemptOutcome::TerminalFailure
                    },
                };
                debug!(?record, error = %err, "Fetch attempt failed");
                if !retry {
                    return Err(err);
                }
                attempt += 1;
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

/// Parses a published rate value.
///
/// Accepts plain non-negative decimals with at most one separator, which may
/// be either `,` or `.`. Signs, digit grouping and exponents are rejected.
pub fn parse_rate_value(raw: &str) -> Result<Decimal, FetchError> {
    let trimmed = raw.trim();
    let invalid = || FetchError::Parse(format!("Invalid rate value: '{raw}'"));

    if trimmed.is_empty() {
        return Err(invalid());
    }
    let mut separators = 0;
    for ch in trimmed.chars() {
        match ch {
            '0'..='9' => {}
            ',' | '.' => separators += 1,
            _ => return Err(invalid()),
        }
    }
    if separators > 1 || trimmed.starts_with([',', '.']) || trimmed.ends_with([',', '.']) {
        return Err(invalid());
    }

    Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| invalid())
}

/// Parses a nominal unit count, which must be a positive integer.
pub fn parse_nominal(raw: &str) -> Result<u32, FetchError> {
    match raw.trim().parse::<u32>() {
        Ok(nominal) if nominal > 0 => Ok(nominal),
        _ => Err(FetchError::Parse(format!("Invalid nominal: '{raw}'"))),
    }
}
