//! Storage port — persistence of the device registry as a whole snapshot.

use std::future::Future;

use lifxctl_domain::device::DeviceRecord;
use lifxctl_domain::error::LifxCtlError;

/// Durable storage for the registry.
///
/// The registry is always read and written as one complete, ordered
/// snapshot. Implementations must replace the previous snapshot atomically:
/// a failed `save` leaves the last good snapshot in place.
pub trait RegistryStore {
    /// Read the stored snapshot, in stored order.
    ///
    /// Missing storage is not an error and yields an empty list.
    fn load(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, LifxCtlError>> + Send;

    /// Replace the stored snapshot with `devices`.
    fn save(&self, devices: &[DeviceRecord]) -> impl Future<Output = Result<(), LifxCtlError>> + Send;
}
