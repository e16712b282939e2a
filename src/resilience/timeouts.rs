//! Cancellation and deadline enforcement.
//!
//! Every network call and every backoff sleep races the caller's
//! [`CancellationToken`]. Cancellation surfaces as [`RpcError::Cancelled`]
//! and is never retried.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::blockchain::error::{RpcError, RpcResult};

/// Run `fut` unless `cancel` fires first.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, fut: F) -> RpcResult<T>
where
    F: Future<Output = RpcResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RpcError::Cancelled),
        result = fut => result,
    }
}

/// Sleep for `delay`, waking early with `Cancelled` if `cancel` fires.
pub async fn sleep_cancellable(cancel: &CancellationToken, delay: Duration) -> RpcResult<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RpcError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Build a token that fires when `parent` fires or after `deadline`.
pub fn with_deadline(parent: &CancellationToken, deadline: Duration) -> CancellationToken {
    let child = parent.child_token();
    let timer = child.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = timer.cancelled() => {}
            _ = tokio::time::sleep(deadline) => timer.cancel(),
        }
    });
    child
}
