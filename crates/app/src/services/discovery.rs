//! Discovery service — registers bulbs found on the network.
//!
//! Naming a new bulb is delegated to a [`NameResolver`], so the interactive
//! prompt of the CLI stays out of the use-case.

use lifxctl_domain::device::DeviceRecord;
use lifxctl_domain::error::{DuplicateNameError, LifxCtlError};

use crate::ports::{DiscoveredLight, LightTransport, RegistryStore, TransportError};
use crate::services::device_registry::DeviceRegistry;

/// Chooses a name for a newly discovered bulb, or `None` to skip it.
pub trait NameResolver {
    fn resolve(&mut self, light: &DiscoveredLight) -> Option<String>;
}

impl<F> NameResolver for F
where
    F: FnMut(&DiscoveredLight) -> Option<String>,
{
    fn resolve(&mut self, light: &DiscoveredLight) -> Option<String> {
        self(light)
    }
}

/// What a discovery run did.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub added: Vec<DeviceRecord>,
    /// Bulbs that were already registered.
    pub already_known: usize,
    /// New bulbs left unnamed.
    pub skipped: usize,
    /// New bulbs whose chosen name was already taken.
    pub rejected: Vec<(DiscoveredLight, DuplicateNameError)>,
}

/// Failure of a discovery run.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("device discovery failed: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Registry(#[from] LifxCtlError),
}

/// Use-case: broadcast discovery and registration of new bulbs.
pub struct DiscoveryService<T> {
    transport: T,
}

impl<T: LightTransport> DiscoveryService<T> {
    /// Create a new service backed by the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Discover bulbs and register every new one the resolver names.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Transport`] when the broadcast fails, or
    /// [`DiscoveryError::Registry`] when a record cannot be stored.
    #[tracing::instrument(skip_all)]
    pub async fn discover<S, R>(
        &self,
        registry: &mut DeviceRegistry<S>,
        resolver: &mut R,
    ) -> Result<DiscoveryReport, DiscoveryError>
    where
        S: RegistryStore,
        R: NameResolver,
    {
        let lights = self.transport.discover().await?;
        tracing::info!(count = lights.len(), "discovery finished");

        let mut report = DiscoveryReport::default();
        for light in lights {
            if registry.contains(light.id) {
                report.already_known += 1;
                continue;
            }

            let name = resolver
                .resolve(&light)
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty());
            let Some(name) = name else {
                tracing::debug!(id = %light.id, "new device skipped");
                report.skipped += 1;
                continue;
            };

            let record = DeviceRecord::builder()
                .id(light.id)
                .name(name)
                .address(light.address)
                .build()
                .map_err(LifxCtlError::from)?;
            match registry.insert(record).await {
                Ok(added) => report.added.push(added.clone()),
                Err(LifxCtlError::DuplicateName(err)) => {
                    tracing::warn!(%err, id = %light.id, "new device not registered");
                    report.rejected.push((light, err));
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(report)
    }
}
