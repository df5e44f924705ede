//! Exponential backoff with jitter for transient Admin API failures.
//!
//! Retries are off by default (`max_retries = 0`): a report either completes
//! from one pass over the API or fails as a whole.

use std::future::Future;
use std::time::Duration;

use crate::error::ShopifyError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that may succeed on a later attempt.
///
/// Retriable: HTTP 429, timeouts and connection failures, and 5xx responses.
/// Everything else (auth failures, 404, malformed bodies, pagination limits)
/// is returned immediately.
pub(crate) fn is_retriable(err: &ShopifyError) -> bool {
    match err {
        ShopifyError::RateLimited { .. } => true,
        ShopifyError::Http(e) => e.is_timeout() || e.is_connect(),
        ShopifyError::UnexpectedStatus { status, .. } => *status >= 500,
        ShopifyError::Deserialize { .. }
        | ShopifyError::Unauthorized { .. }
        | ShopifyError::NotFound { .. }
        | ShopifyError::InvalidBaseUrl { .. }
        | ShopifyError::PaginationLimit { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
///
/// A 429 waits at least as long as the server's `Retry-After`.
fn base_delay_ms(err: &ShopifyError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let exponential = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    let floor = match err {
        ShopifyError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    exponential.max(floor).min(MAX_DELAY_MS)
}

/// Runs `operation`, retrying up to `max_retries` additional times on
/// transient errors with `backoff_base_ms * 2^(attempt-1)` ± 25 % jitter.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let base = base_delay_ms(&err, attempt, backoff_base_ms);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (base as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient Shopify error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited(retry_after_secs: u64) -> ShopifyError {
        ShopifyError::RateLimited {
            store: "acme-tea.myshopify.com".to_owned(),
            retry_after_secs,
        }
    }

    #[test]
    fn server_errors_are_retriable_client_errors_are_not() {
        assert!(is_retriable(&ShopifyError::UnexpectedStatus {
            status: 502,
            url: "u".to_owned()
        }));
        assert!(!is_retriable(&ShopifyError::UnexpectedStatus {
            status: 422,
            url: "u".to_owned()
        }));
        assert!(!is_retriable(&ShopifyError::Unauthorized {
            status: 401,
            url: "u".to_owned()
        }));
        assert!(is_retriable(&rate_limited(1)));
    }

    #[test]
    fn rate_limit_delay_honours_retry_after() {
        assert_eq!(base_delay_ms(&rate_limited(4), 1, 100), 4_000);
        assert_eq!(base_delay_ms(&rate_limited(0), 3, 100), 400);
    }

    #[test]
    fn delay_is_capped() {
        assert_eq!(base_delay_ms(&rate_limited(0), 10, 60_000), MAX_DELAY_MS);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited(0))
                } else {
                    Ok::<u32, ShopifyError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_makes_exactly_one_attempt() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(0, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ShopifyError>(rate_limited(0))
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ShopifyError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_unauthorized() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ShopifyError>(ShopifyError::Unauthorized {
                    status: 401,
                    url: "https://acme-tea.myshopify.com/admin/api/2024-10/orders.json".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ShopifyError::Unauthorized { .. })));
    }
}
