//! Cancellation root for the process.

use tokio_util::sync::CancellationToken;

use crate::lifecycle::signals::wait_for_signal;

/// Coordinator for cancelling in-flight work.
///
/// Every network-facing operation takes a token derived from this one.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to hand to operations.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel everything holding a token from this coordinator.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel on the first termination signal.
    pub fn listen_for_signals(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                signal = wait_for_signal() => {
                    tracing::warn!(signal, "Termination signal received, cancelling in-flight operations");
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        });
    }
}
