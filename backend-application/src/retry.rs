use std::future::Future;

use tracing::warn;

/// Runs `operation` once plus up to `max_retries` more times, returning the first success
/// or the last error. Attempts are immediate; there is no backoff.
pub async fn retry_operation<T, F, Fut>(max_retries: u32, mut operation: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries => {
                attempt += 1;
                warn!(attempt, max_retries, "retrying after error: {err:#}");
            }
            Err(err) => return Err(err),
        }
    }
}
