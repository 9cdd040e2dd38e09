//! # lifxctl-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RegistryStore` — load & save the device registry snapshot
//!   - `LightTransport` / `LightHandle` — discover bulbs and talk to one bulb
//! - Define **driving/inbound** use-cases:
//!   - `DeviceRegistry` — add, look up, list, repair addresses
//!   - `DiscoveryService` — register newly seen bulbs through a name resolver
//!   - `CommandEngine` — resolve, connect, self-heal, execute, report
//! - Provide the failure-handling core: `RetryExecutor` and `VerifiedOperations`
//!
//! ## Dependency rule
//! Depends on `lifxctl-domain` only (plus `tokio::time` for backoff sleeps).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod retry;
pub mod services;
pub mod verified;

#[cfg(test)]
pub(crate) mod testing;
