//! Bounded retry with exponential backoff around bulb operations.
//!
//! An operation is retried only when it fails with a [`TransportError`].
//! Between attempts the handle gets a best-effort [`LightHandle::refresh`].
//! Any other failure ends the run immediately.

use std::future::Future;
use std::time::Duration;

use lifxctl_domain::error::{LifxCtlError, ValidationError};

use crate::ports::{LightHandle, TransportError};

/// How many times to try, and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay unit of the exponential backoff.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before the 1-based `attempt`.
    ///
    /// The first attempt starts immediately; attempt `n > 1` waits
    /// `base_delay * 2^(n-1)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Failure of a single attempt, classified for the retry decision.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// Retryable.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    InvalidParameter(#[from] ValidationError),

    #[error(transparent)]
    Unexpected(Box<dyn std::error::Error + Send + Sync>),
}

/// Terminal, user-facing failure of a command.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[source] ValidationError),

    #[error("failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: TransportError,
    },

    #[error("unexpected error: {0}")]
    Unexpected(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("could not find device {name} on the network")]
    DeviceNotOnNetwork { name: String },

    #[error("device rediscovery failed: {0}")]
    Discovery(#[source] TransportError),

    #[error("failed to update device registry: {0}")]
    Registry(#[source] LifxCtlError),
}

impl ControlError {
    /// Whether re-running discovery is a sensible next step for the user.
    #[must_use]
    pub fn suggests_rediscovery(&self) -> bool {
        matches!(
            self,
            Self::Unexpected(_) | Self::Discovery(_) | Self::Registry(_)
        )
    }
}

/// Runs operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `operation` until it succeeds, fails with a non-transport error,
    /// or all attempts are spent.
    ///
    /// # Errors
    ///
    /// - [`ControlError::InvalidParameter`] / [`ControlError::Unexpected`] on the
    ///   first non-transport failure, without retrying.
    /// - [`ControlError::Exhausted`] wrapping the last transport error once
    ///   `max_attempts` attempts have failed.
    pub async fn run<H, T, F, Fut>(&self, handle: &H, mut operation: F) -> Result<T, ControlError>
    where
        H: LightHandle,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            if attempt > 1 {
                let delay = self.policy.delay_for_attempt(attempt);
                tracing::warn!(attempt, max_attempts, ?delay, "retrying");
                tokio::time::sleep(delay).await;
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(OperationError::Transport(err)) => {
                    tracing::warn!(%err, attempt, max_attempts, device = %handle.id(), "communication error");
                    if let Err(refresh_err) = handle.refresh().await {
                        tracing::debug!(%refresh_err, "connection refresh failed");
                    }
                    if attempt >= max_attempts {
                        return Err(ControlError::Exhausted {
                            attempts: max_attempts,
                            last: err,
                        });
                    }
                    attempt += 1;
                }
                Err(OperationError::InvalidParameter(err)) => {
                    return Err(ControlError::InvalidParameter(err));
                }
                Err(OperationError::Unexpected(err)) => {
                    return Err(ControlError::Unexpected(err));
                }
            }
        }
    }
}
