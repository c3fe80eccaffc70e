//! Retry mechanism with exponential backoff and jitter
//!
//! [`retry_with_backoff`] is the primitive. The removal engine uses two
//! strategies built on the same backoff schedule:
//!
//! - [`retry_whole_operation`] re-issues the identical request (single object
//!   delete, bucket delete, listing pages).
//! - [`retry_failed_subset`] resubmits only the keys the previous batch call
//!   reported as failed.
//!
//! Both count the first call as an attempt, so `max_attempts` is the total
//! number of calls made for one logical operation.

use std::collections::HashSet;
use std::time::Duration;

use crate::alias::RetryConfig;
use crate::error::{Error, ResourceScope, Result};

/// Retry a fallible async operation with exponential backoff
///
/// # Arguments
/// * `config` - Retry configuration
/// * `operation` - Async closure that returns `Result<T>`
/// * `is_retryable` - Closure that determines if an error should trigger retry
///
/// # Example
/// ```ignore
/// let result = retry_with_backoff(
///     &config,
///     || async { store.delete_bucket("b").await },
///     is_retryable_error,
/// ).await;
/// ```
pub async fn retry_with_backoff<T, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: R,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
    R: Fn(&Error) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= config.max_attempts || !is_retryable(&e) {
                    return Err(e);
                }

                let backoff = calculate_backoff(config, attempt);
                tracing::debug!(
                    attempt = attempt,
                    backoff_ms = backoff.as_millis(),
                    error = %e,
                    "Retrying after error"
                );

                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// Calculate backoff duration with jitter
fn calculate_backoff(config: &RetryConfig, attempt: u32) -> Duration {
    // Exponential backoff: initial * 2^(attempt-1)
    let base_ms = config.initial_backoff_ms * (1u64 << (attempt - 1).min(10));
    let capped_ms = base_ms.min(config.max_backoff_ms);

    let jitter_ms = rand_jitter(capped_ms);
    Duration::from_millis(capped_ms + jitter_ms)
}

/// Generate pseudo-random jitter without external RNG dependency
fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    nanos % max.max(1)
}

/// Whether another attempt could change the outcome
///
/// Credential, argument and configuration failures repeat identically on
/// every call. Everything the backend reports about resource state, including
/// `Conflict` from a bucket that is still draining, is worth another attempt.
pub fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Argument(_)
        | Error::InvalidPath(_)
        | Error::Config(_)
        | Error::AliasNotFound(_)
        | Error::Auth(_)
        | Error::UnsupportedFeature(_) => false,
        Error::Resource { source, .. } => is_retryable_error(source),
        Error::Network(_)
        | Error::NotFound(_)
        | Error::Conflict(_)
        | Error::Io(_)
        | Error::General(_) => true,
    }
}

/// The resource a retried operation acts on, used to scope terminal errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTarget {
    pub scope: ResourceScope,
    pub identifier: String,
}

impl ResourceTarget {
    pub fn object(key: impl Into<String>) -> Self {
        Self {
            scope: ResourceScope::Object,
            identifier: key.into(),
        }
    }

    pub fn bucket(name: impl Into<String>) -> Self {
        Self {
            scope: ResourceScope::Bucket,
            identifier: name.into(),
        }
    }

    pub fn fragment(key: impl Into<String>) -> Self {
        Self {
            scope: ResourceScope::Fragment,
            identifier: key.into(),
        }
    }

    /// Wrap the last failure as a terminal error for this resource
    pub fn exhausted(&self, attempts: u32, cause: Error) -> Error {
        Error::resource(self.scope, self.identifier.clone(), attempts, cause)
    }
}

/// Whole-operation retry: re-issue the identical request until it succeeds
/// or the budget is spent
///
/// Every retryable failure counts against the budget; a failure that
/// [`is_retryable_error`] rejects ends the run at once. The last failure is
/// returned wrapped as an [`Error::Resource`] naming `target`.
pub async fn retry_whole_operation<T, F, Fut>(
    config: &RetryConfig,
    target: &ResourceTarget,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempts = 0u32;
    let result = retry_with_backoff(
        config,
        || {
            attempts += 1;
            operation()
        },
        is_retryable_error,
    )
    .await;

    result.map_err(|e| {
        tracing::warn!(
            scope = %target.scope,
            identifier = %target.identifier,
            attempts,
            error = %e,
            "Giving up on resource"
        );
        target.exhausted(attempts, e)
    })
}

/// Result of a failed-subset retry run
#[derive(Debug, Default)]
pub struct SubsetReport {
    /// Keys still failing after the last attempt
    pub failed: Vec<String>,
    pub attempts: u32,
    /// Error returned by the last call, if the call itself failed
    pub last_error: Option<Error>,
}

impl SubsetReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Convert into a terminal error scoped to `target` when keys remain
    pub fn into_result(self, target: &ResourceTarget) -> Result<()> {
        if self.failed.is_empty() {
            return Ok(());
        }

        let cause = self.last_error.unwrap_or_else(|| {
            let sample: Vec<&str> = self.failed.iter().take(3).map(String::as_str).collect();
            Error::General(format!(
                "{} key(s) could not be deleted (e.g. {})",
                self.failed.len(),
                sample.join(", ")
            ))
        });
        Err(target.exhausted(self.attempts, cause))
    }
}

/// Failed-subset retry: submit `keys`, then resubmit only the keys reported
/// as failed, until none remain or the budget is spent
///
/// If a call errors as a whole, every key it carried is treated as failed.
/// Reported keys that were not part of the submission are ignored, and a key
/// reported twice is resubmitted once.
pub async fn retry_failed_subset<F, Fut>(
    config: &RetryConfig,
    keys: Vec<String>,
    mut operation: F,
) -> SubsetReport
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: std::future::Future<Output = Result<Vec<String>>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut report = SubsetReport {
        failed: keys,
        ..Default::default()
    };

    while !report.failed.is_empty() && report.attempts < max_attempts {
        if report.attempts > 0 {
            let backoff = calculate_backoff(config, report.attempts);
            tracing::debug!(
                attempt = report.attempts + 1,
                keys = report.failed.len(),
                backoff_ms = backoff.as_millis(),
                "Resubmitting failed keys"
            );
            tokio::time::sleep(backoff).await;
        }
        report.attempts += 1;

        let submitted = std::mem::take(&mut report.failed);
        match operation(submitted.clone()).await {
            Ok(reported) => {
                let failed = submitted_subset(&submitted, reported);
                if !failed.is_empty() {
                    tracing::warn!(
                        submitted = submitted.len(),
                        failed = failed.len(),
                        attempt = report.attempts,
                        "Batch delete partially failed"
                    );
                }
                report.failed = failed;
                report.last_error = None;
            }
            Err(e) => {
                tracing::warn!(
                    submitted = submitted.len(),
                    attempt = report.attempts,
                    error = %e,
                    "Batch delete call failed"
                );
                let retryable = is_retryable_error(&e);
                report.failed = submitted;
                report.last_error = Some(e);
                if !retryable {
                    break;
                }
            }
        }
    }

    report
}

/// Keep the reported keys that were submitted, once each, in submission order
fn submitted_subset(submitted: &[String], reported: Vec<String>) -> Vec<String> {
    let reported: HashSet<String> = reported.into_iter().collect();
    let mut seen = HashSet::new();
    submitted
        .iter()
        .filter(|key| reported.contains(*key) && seen.insert(key.as_str()))
        .cloned()
        .collect()
}

/// Retry configuration builder for easy customization
#[derive(Debug, Clone)]
pub struct RetryBuilder {
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self::from(RetryConfig::default())
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn initial_backoff_ms(mut self, ms: u64) -> Self {
        self.initial_backoff_ms = ms;
        self
    }

    pub fn max_backoff_ms(mut self, ms: u64) -> Self {
        self.max_backoff_ms = ms;
        self
    }

    pub fn build(self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_backoff_ms: self.initial_backoff_ms,
            max_backoff_ms: self.max_backoff_ms,
        }
    }
}

impl From<RetryConfig> for RetryBuilder {
    fn from(config: RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
        }
    }
}

impl Default for RetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
