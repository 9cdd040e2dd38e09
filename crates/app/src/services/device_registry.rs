//! Device registry — the named set of known bulbs, persisted through a [`RegistryStore`].

use lifxctl_domain::address::{IpAddress, MacAddress};
use lifxctl_domain::device::DeviceRecord;
use lifxctl_domain::error::{DuplicateNameError, LifxCtlError, NotFoundError};

use crate::ports::RegistryStore;

/// In-memory registry backed by a snapshot store.
///
/// Records keep insertion (or load) order. Every mutation is persisted
/// immediately; when persisting fails, the in-memory state is rolled back so
/// it keeps matching the stored snapshot.
pub struct DeviceRegistry<S> {
    store: S,
    devices: Vec<DeviceRecord>,
}

impl<S: RegistryStore> DeviceRegistry<S> {
    /// Load the registry from `store`. Missing storage yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot exists but cannot be read.
    #[tracing::instrument(skip(store))]
    pub async fn load(store: S) -> Result<Self, LifxCtlError> {
        let devices = store.load().await?;
        tracing::debug!(count = devices.len(), "registry loaded");
        Ok(Self { store, devices })
    }

    /// Validate raw input and register the device.
    ///
    /// # Errors
    ///
    /// Returns [`LifxCtlError::Validation`] for a malformed IP, MAC or name,
    /// [`LifxCtlError::DuplicateName`] when the name is taken, or a storage error.
    pub async fn add(
        &mut self,
        id: &str,
        name: &str,
        address: &str,
    ) -> Result<&DeviceRecord, LifxCtlError> {
        let record = DeviceRecord::parse(id, name, address)?;
        self.insert(record).await
    }

    /// Register `record`, replacing any record with the same id in place.
    ///
    /// The name must not match any existing record case-insensitively,
    /// including the one being replaced.
    ///
    /// # Errors
    ///
    /// Returns [`LifxCtlError::Validation`] for a blank name,
    /// [`LifxCtlError::DuplicateName`] when the name is taken, or a storage error.
    #[tracing::instrument(skip(self, record), fields(id = %record.id, name = %record.name))]
    pub async fn insert(&mut self, record: DeviceRecord) -> Result<&DeviceRecord, LifxCtlError> {
        record.validate()?;
        if self.find_by_name(&record.name).is_some() {
            return Err(DuplicateNameError { name: record.name }.into());
        }

        let (index, replaced) = match self.position(record.id) {
            Some(index) => (
                index,
                Some(std::mem::replace(&mut self.devices[index], record)),
            ),
            None => {
                self.devices.push(record);
                (self.devices.len() - 1, None)
            }
        };

        if let Err(err) = self.store.save(&self.devices).await {
            match replaced {
                Some(previous) => self.devices[index] = previous,
                None => {
                    self.devices.pop();
                }
            }
            return Err(err);
        }

        tracing::info!("device registered");
        Ok(&self.devices[index])
    }

    /// Case-insensitive exact name lookup; the first match in order wins.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&DeviceRecord> {
        self.devices.iter().find(|device| device.has_name(name))
    }

    #[must_use]
    pub fn find_by_id(&self, id: MacAddress) -> Option<&DeviceRecord> {
        self.devices.iter().find(|device| device.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: MacAddress) -> bool {
        self.position(id).is_some()
    }

    /// Replace the stored address of device `id` and persist.
    ///
    /// # Errors
    ///
    /// Returns [`LifxCtlError::NotFound`] for an unknown id, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn update_address(
        &mut self,
        id: MacAddress,
        address: IpAddress,
    ) -> Result<(), LifxCtlError> {
        let index = self.position(id).ok_or_else(|| NotFoundError {
            entity: "Device",
            id: id.to_string(),
        })?;

        let previous = std::mem::replace(&mut self.devices[index].address, address);
        if let Err(err) = self.store.save(&self.devices).await {
            self.devices[index].address = previous;
            return Err(err);
        }
        tracing::info!(%previous, "device address updated");
        Ok(())
    }

    /// All records, in insertion/load order.
    #[must_use]
    pub fn list(&self) -> &[DeviceRecord] {
        &self.devices
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Persist the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn save(&self) -> Result<(), LifxCtlError> {
        self.store.save(&self.devices).await
    }

    fn position(&self, id: MacAddress) -> Option<usize> {
        self.devices.iter().position(|device| device.id == id)
    }
}
