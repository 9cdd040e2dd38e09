//! Command engine — runs one command against one named bulb.
//!
//! The engine resolves the name through the [`DeviceRegistry`], connects to
//! the stored address and probes it. A bulb that does not answer is looked up
//! again on the network; when it shows up under a new address the registry
//! is repaired before the command runs.

use lifxctl_domain::command::{Command, DeviceStatus};
use lifxctl_domain::device::DeviceRecord;

use crate::ports::{LightHandle, LightTransport, RegistryStore};
use crate::retry::ControlError;
use crate::services::device_registry::DeviceRegistry;
use crate::verified::VerifiedOperations;

/// A command addressed to a device by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub device_name: String,
    pub command: Command,
}

/// Reported result of a single command.
#[derive(Debug)]
pub enum CommandOutcome {
    Succeeded {
        device: DeviceRecord,
        command: Command,
        /// Present for [`Command::Status`].
        status: Option<DeviceStatus>,
    },
    /// No registered device has this name.
    NotFound { name: String },
    Failed {
        /// The device name as requested.
        device: String,
        /// The requested verb.
        command: String,
        error: ControlError,
    },
}

impl CommandOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Use-case: resolve, connect (healing stale addresses) and execute.
pub struct CommandEngine<S, T> {
    registry: DeviceRegistry<S>,
    transport: T,
    operations: VerifiedOperations,
}

impl<S, T> CommandEngine<S, T>
where
    S: RegistryStore,
    T: LightTransport,
{
    pub fn new(registry: DeviceRegistry<S>, transport: T, operations: VerifiedOperations) -> Self {
        Self {
            registry,
            transport,
            operations,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry<S> {
        &self.registry
    }

    /// Parse `verb` and `args`, then execute.
    ///
    /// An unknown name is reported as not found whatever the arguments are;
    /// invalid parameters for a known device never reach the network.
    pub async fn execute_raw<A: AsRef<str>>(
        &mut self,
        name: &str,
        verb: &str,
        args: &[A],
    ) -> CommandOutcome {
        match Command::parse(verb, args) {
            Ok(command) => {
                let request = CommandRequest {
                    device_name: name.to_string(),
                    command,
                };
                self.execute(&request).await
            }
            Err(_) if self.registry.find_by_name(name).is_none() => {
                tracing::info!(device = name, "device not registered");
                CommandOutcome::NotFound {
                    name: name.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!(%err, verb, "invalid command parameters");
                CommandOutcome::Failed {
                    device: name.to_string(),
                    command: verb.to_string(),
                    error: ControlError::InvalidParameter(err),
                }
            }
        }
    }

    /// Execute a parsed command. Every failure ends up in the outcome.
    #[tracing::instrument(
        skip_all,
        fields(device = %request.device_name, command = %request.command)
    )]
    pub async fn execute(&mut self, request: &CommandRequest) -> CommandOutcome {
        tracing::debug!("resolving device");
        let Some(device) = self.registry.find_by_name(&request.device_name).cloned() else {
            tracing::info!("device not registered");
            return CommandOutcome::NotFound {
                name: request.device_name.clone(),
            };
        };

        let result = match self.connect(device).await {
            Ok((handle, device)) => {
                tracing::info!(address = %device.address, "executing");
                self.run(&handle, request.command)
                    .await
                    .map(|status| (device, status))
            }
            Err(err) => Err(err),
        };

        match result {
            Ok((device, status)) => {
                tracing::info!("command succeeded");
                CommandOutcome::Succeeded {
                    device,
                    command: request.command,
                    status,
                }
            }
            Err(error) => {
                tracing::warn!(%error, "command failed");
                CommandOutcome::Failed {
                    device: request.device_name.clone(),
                    command: request.command.verb().to_string(),
                    error,
                }
            }
        }
    }

    async fn connect(
        &mut self,
        device: DeviceRecord,
    ) -> Result<(T::Handle, DeviceRecord), ControlError> {
        tracing::info!(address = %device.address, "connecting");
        let handle = self.transport.connect(device.id, device.address);
        match handle.label().await {
            Ok(label) => {
                tracing::debug!(%label, "device answered");
                Ok((handle, device))
            }
            Err(err) => {
                tracing::warn!(%err, address = %device.address, "device did not answer");
                self.heal(device).await
            }
        }
    }

    async fn heal(
        &mut self,
        mut device: DeviceRecord,
    ) -> Result<(T::Handle, DeviceRecord), ControlError> {
        tracing::info!("rediscovering device");
        let lights = self
            .transport
            .discover()
            .await
            .map_err(ControlError::Discovery)?;
        let Some(light) = lights.into_iter().find(|light| light.id == device.id) else {
            return Err(ControlError::DeviceNotOnNetwork { name: device.name });
        };

        if light.address != device.address {
            self.registry
                .update_address(device.id, light.address)
                .await
                .map_err(ControlError::Registry)?;
            device.address = light.address;
        }
        Ok((self.transport.connect(device.id, device.address), device))
    }

    async fn run(
        &self,
        handle: &T::Handle,
        command: Command,
    ) -> Result<Option<DeviceStatus>, ControlError> {
        match command {
            Command::Power { on } => self.operations.set_power_verified(handle, on).await?,
            Command::Brightness { level } => {
                self.operations
                    .set_brightness_verified(handle, level)
                    .await?;
            }
            Command::Color(color) => self.operations.set_color_verified(handle, color).await?,
            Command::Status => {
                return self
                    .operations
                    .get_status_verified(handle)
                    .await
                    .map(Some);
            }
        }
        Ok(None)
    }
}
