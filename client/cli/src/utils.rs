use {serde::Serialize, tokio::task, tracing::warn};

use crate::error::{CliError, CliResult};

/// Calls `f` until it succeeds, at most `attempts` times.
///
/// Missing accounts are not retried.
pub async fn retry<T, F>(attempts: u32, mut f: F) -> CliResult<T>
where
    F: FnMut() -> CliResult<T>,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match f() {
            Ok(value) => return Ok(value),
            Err(e @ CliError::AccountNotFound(_)) => return Err(e),
            Err(e) if tries >= attempts => {
                return Err(CliError::RetriesExhausted {
                    attempts: tries,
                    last: e.to_string(),
                })
            }
            Err(e) => warn!("Attempt {} failed with {}, retrying", tries, e),
        }
        task::yield_now().await;
    }
}

pub fn print_json<T: Serialize>(data: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}
