//! Transport port — how the core reaches LIFX bulbs on the local network.
//!
//! The packet format lives behind this boundary. The core only sees a
//! discovery call and a per-bulb [`LightHandle`] whose operations may fail
//! with a [`TransportError`].

use std::future::Future;

use lifxctl_domain::address::{IpAddress, MacAddress};
use lifxctl_domain::color::Hsbk;

/// A bulb that answered a discovery broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLight {
    pub id: MacAddress,
    pub address: IpAddress,
}

/// Communication failure with a bulb. Always considered retryable.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no reply from {target} after {attempts} attempts")]
    Timeout { target: String, attempts: u32 },

    #[error("packet codec error: {0}")]
    Codec(String),

    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The bulb answered, but its state does not match what was commanded.
    #[error("{0}")]
    Verification(String),
}

/// Entry point of a transport: discovery and handle construction.
pub trait LightTransport {
    type Handle: LightHandle;

    /// Broadcast a discovery request and collect the bulbs that answer.
    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredLight>, TransportError>> + Send;

    /// Build a handle for the bulb `id` at `address`.
    ///
    /// No traffic is sent; liveness is checked by the caller.
    fn connect(&self, id: MacAddress, address: IpAddress) -> Self::Handle;
}

/// Operations on one bulb.
pub trait LightHandle {
    fn id(&self) -> MacAddress;

    fn address(&self) -> IpAddress;

    /// Read the bulb's label. Cheap, used as a liveness probe.
    fn label(&self) -> impl Future<Output = Result<String, TransportError>> + Send;

    fn power(&self) -> impl Future<Output = Result<bool, TransportError>> + Send;

    fn set_power(&self, on: bool) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn color(&self) -> impl Future<Output = Result<Hsbk, TransportError>> + Send;

    fn set_color(&self, color: Hsbk) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Re-establish contact with the bulb after a communication failure.
    fn refresh(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
