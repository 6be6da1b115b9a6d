use std::future::Future;
use std::time::Duration;

use crate::error::LlmError;

const BASE_BACKOFF_SECS: u64 = 1;

/// Seconds from the `Retry-After` header, else exponential backoff.
pub(crate) fn retry_delay(response: &reqwest::Response, attempt: u32) -> Duration {
    if let Some(val) = response.headers().get("retry-after")
        && let Ok(s) = val.to_str()
        && let Ok(secs) = s.trim().parse::<u64>()
    {
        return Duration::from_secs(secs);
    }
    backoff(attempt)
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(BASE_BACKOFF_SECS << attempt.min(6))
}

/// Send an HTTP request, retrying up to `max_retries` times on 429 responses.
///
/// Any other status is handed back to the caller untouched.
///
/// # Errors
///
/// Returns `LlmError::RateLimited` if all attempts are rate limited, or the
/// underlying transport error wrapped as `LlmError::Http`.
pub(crate) async fn send_with_retry<F, Fut>(
    provider_name: &str,
    max_retries: u32,
    mut f: F,
) -> Result<reqwest::Response, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..=max_retries {
        let response = f().await.map_err(LlmError::Http)?;
        if response.status() != reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Ok(response);
        }
        if attempt == max_retries {
            break;
        }
        let delay = retry_delay(&response, attempt);
        tracing::warn!(
            provider = provider_name,
            delay_secs = delay.as_secs(),
            attempt = attempt + 1,
            max_retries,
            "rate limited, backing off"
        );
        tokio::time::sleep(delay).await;
    }

    Err(LlmError::RateLimited)
}
