//! Device record — a named LIFX bulb known to the registry.

use crate::address::{IpAddress, MacAddress};
use crate::error::ValidationError;

/// A registered bulb: its MAC identity, human name and last known address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub id: MacAddress,
    pub name: String,
    pub address: IpAddress,
}

impl DeviceRecord {
    /// Create a builder for constructing a [`DeviceRecord`].
    #[must_use]
    pub fn builder() -> DeviceRecordBuilder {
        DeviceRecordBuilder::default()
    }

    /// Build a record from raw user input, checking the IP, then the MAC, then the name.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first field that fails.
    pub fn parse(id: &str, name: &str, address: &str) -> Result<Self, ValidationError> {
        let address: IpAddress = address.parse()?;
        let id: MacAddress = id.parse()?;
        Self::builder().id(id).name(name).address(address).build()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] when `name` is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    /// Case-insensitive name comparison used for lookups and uniqueness.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Step-by-step builder for [`DeviceRecord`].
#[derive(Debug, Default)]
pub struct DeviceRecordBuilder {
    id: Option<MacAddress>,
    name: Option<String>,
    address: Option<IpAddress>,
}

impl DeviceRecordBuilder {
    #[must_use]
    pub fn id(mut self, id: MacAddress) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: IpAddress) -> Self {
        self.address = Some(address);
        self
    }

    /// Consume the builder, validate, and return a [`DeviceRecord`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the id or address is missing, or the
    /// name is missing or blank.
    pub fn build(self) -> Result<DeviceRecord, ValidationError> {
        let record = DeviceRecord {
            id: self.id.ok_or_else(|| ValidationError::InvalidMac(String::new()))?,
            name: self.name.unwrap_or_default(),
            address: self
                .address
                .ok_or_else(|| ValidationError::InvalidIp(String::new()))?,
        };
        record.validate()?;
        Ok(record)
    }
}
