//! # lifxctl-adapter-storage-json
//!
//! JSON file persistence for the device registry.
//!
//! ## Responsibilities
//! - Implement the `RegistryStore` port defined in `lifxctl-app::ports::storage`
//! - Map between domain [`DeviceRecord`](lifxctl_domain::device::DeviceRecord)s
//!   and the on-disk document
//! - Replace the file atomically on every save
//!
//! ## File format
//! ```json
//! {
//!   "devices": {
//!     "d0:73:d5:01:02:03": { "name": "Lamp1", "ip": "192.168.1.20" }
//!   }
//! }
//! ```
//!
//! ## Dependency rule
//! Depends on `lifxctl-app` (for port traits) and `lifxctl-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod store;

pub use error::StorageError;
pub use store::JsonFileStore;
