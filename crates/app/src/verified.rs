//! Act-then-verify bulb operations.
//!
//! Each mutation is followed by a settle delay and a read-back. The mutation
//! and its verification run as one unit through the [`RetryExecutor`], so a
//! read-back that disagrees with the command is retried like any other
//! communication failure.
//!
//! Bulbs quantize commanded values, so color and brightness read-backs are
//! accepted within [`VerificationPolicy::tolerance`] units of the target.

use std::time::Duration;

use lifxctl_domain::color::Hsbk;
use lifxctl_domain::command::DeviceStatus;

use crate::ports::{LightHandle, TransportError};
use crate::retry::{ControlError, OperationError, RetryExecutor};

/// Read-back acceptance rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationPolicy {
    /// Time given to the bulb to apply a change before reading it back.
    pub settle_delay: Duration,
    /// Largest accepted absolute difference per color component.
    pub tolerance: u16,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            tolerance: 100,
        }
    }
}

/// Verified power, brightness, color and status operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifiedOperations {
    executor: RetryExecutor,
    verification: VerificationPolicy,
}

impl VerifiedOperations {
    #[must_use]
    pub fn new(executor: RetryExecutor, verification: VerificationPolicy) -> Self {
        Self {
            executor,
            verification,
        }
    }

    /// Switch the bulb on or off and confirm the new power state.
    ///
    /// # Errors
    ///
    /// Returns a [`ControlError`] once the retry budget is spent.
    pub async fn set_power_verified<H: LightHandle>(
        &self,
        handle: &H,
        on: bool,
    ) -> Result<(), ControlError> {
        let settle = self.verification.settle_delay;
        self.executor
            .run(handle, || apply_power(handle, on, settle))
            .await
    }

    /// Change only the brightness, keeping hue, saturation and kelvin.
    ///
    /// # Errors
    ///
    /// Returns a [`ControlError`] once the retry budget is spent.
    pub async fn set_brightness_verified<H: LightHandle>(
        &self,
        handle: &H,
        level: u16,
    ) -> Result<(), ControlError> {
        let policy = self.verification;
        self.executor
            .run(handle, || apply_brightness(handle, level, policy))
            .await
    }

    /// Set all four color components and confirm them.
    ///
    /// # Errors
    ///
    /// Returns a [`ControlError`] once the retry budget is spent.
    pub async fn set_color_verified<H: LightHandle>(
        &self,
        handle: &H,
        color: Hsbk,
    ) -> Result<(), ControlError> {
        let policy = self.verification;
        self.executor
            .run(handle, || apply_color(handle, color, policy))
            .await
    }

    /// Read power and color. Nothing is mutated; only transport errors are retried.
    ///
    /// # Errors
    ///
    /// Returns a [`ControlError`] once the retry budget is spent.
    pub async fn get_status_verified<H: LightHandle>(
        &self,
        handle: &H,
    ) -> Result<DeviceStatus, ControlError> {
        self.executor.run(handle, || read_status(handle)).await
    }
}

async fn apply_power<H: LightHandle>(
    handle: &H,
    on: bool,
    settle: Duration,
) -> Result<(), OperationError> {
    handle.set_power(on).await?;
    tokio::time::sleep(settle).await;
    let actual = handle.power().await?;
    if actual != on {
        return Err(TransportError::Verification(format!(
            "power state verification failed: expected {}, read {}",
            power_label(on),
            power_label(actual)
        ))
        .into());
    }
    Ok(())
}

async fn apply_brightness<H: LightHandle>(
    handle: &H,
    level: u16,
    policy: VerificationPolicy,
) -> Result<(), OperationError> {
    let current = handle.color().await?;
    handle.set_color(current.with_brightness(level)).await?;
    tokio::time::sleep(policy.settle_delay).await;
    let actual = handle.color().await?.brightness;
    if actual.abs_diff(level) > policy.tolerance {
        return Err(TransportError::Verification(format!(
            "brightness verification failed: expected {level}, read {actual}"
        ))
        .into());
    }
    Ok(())
}

async fn apply_color<H: LightHandle>(
    handle: &H,
    color: Hsbk,
    policy: VerificationPolicy,
) -> Result<(), OperationError> {
    handle.set_color(color).await?;
    tokio::time::sleep(policy.settle_delay).await;
    let actual = handle.color().await?;
    if !actual.is_close_to(color, policy.tolerance) {
        return Err(TransportError::Verification(format!(
            "color verification failed: expected {color}, read {actual}"
        ))
        .into());
    }
    Ok(())
}

async fn read_status<H: LightHandle>(handle: &H) -> Result<DeviceStatus, OperationError> {
    let power = handle.power().await?;
    let color = handle.color().await?;
    Ok(DeviceStatus { power, color })
}

fn power_label(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
