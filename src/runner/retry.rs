use crate::config::RetryConfig;
use crate::error::{ReasonerError, SpecialistError};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Whether another attempt could plausibly succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for SpecialistError {
    fn is_retryable(&self) -> bool {
        match self {
            // Same bundle, same slice: retrying cannot help
            SpecialistError::Slice(_) => false,
            SpecialistError::Reasoner(ReasonerError::Io(e)) => {
                e.kind() != std::io::ErrorKind::NotFound
            }
            _ => true,
        }
    }
}

/// Execute an async operation with jittered exponential backoff
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    unit: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display + Retryable,
{
    let mut attempts = 0;
    let mut backoff_ms = config.backoff_base_ms;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempts >= config.max_attempts => {
                warn!("{}: all {} attempts failed: {}", unit, attempts, e);
                return Err(e);
            }
            Err(e) => {
                // Jittered backoff: base * 2^attempt + random(0..base)
                let jitter = if config.backoff_base_ms > 0 {
                    rand::random::<u64>() % config.backoff_base_ms
                } else {
                    0
                };
                let delay = Duration::from_millis(backoff_ms + jitter);

                warn!(
                    "{}: attempt {} failed: {}. Retrying in {:?}...",
                    unit, attempts, e, delay
                );

                sleep(delay).await;
                backoff_ms = backoff_ms.saturating_mul(2);
            }
        }
    }
}
