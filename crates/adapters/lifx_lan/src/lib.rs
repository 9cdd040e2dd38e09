//! # lifxctl-adapter-lifx-lan
//!
//! LIFX LAN protocol adapter — talks to bulbs over UDP using the packet
//! definitions from [`lifx_core`].
//!
//! ## How it works
//!
//! Discovery broadcasts a `GetService` packet and collects the `StateService`
//! replies; the MAC address of each bulb is the frame target of its reply.
//! Every other operation is a unicast request with `res_required` set,
//! answered by the matching `State*` message:
//!
//! | Operation | Request | Reply |
//! |-----------|---------|-------|
//! | label | `GetLabel` | `StateLabel` |
//! | power | `LightGetPower` | `LightStatePower` |
//! | set power | `LightSetPower` | `LightStatePower` |
//! | color | `LightGet` | `LightState` |
//! | set color | `LightSetColor` | `LightState` |
//! | refresh | `GetService` | `StateService` |
//!
//! Replies are matched on the transport's source id and the per-handle
//! sequence number. A request without a reply is re-sent a bounded number of
//! times before it fails with a timeout.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `lifxctl-app` and `lifxctl-domain`.

mod config;
mod error;
mod protocol;
mod transport;

pub use config::LanConfig;
pub use error::LanError;
pub use transport::{LanHandle, LanTransport};
