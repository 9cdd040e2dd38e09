//! UDP implementation of [`LightTransport`] and [`LightHandle`].

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use lifx_core::{BuildOptions, Message};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::Instant;

use lifxctl_app::ports::{DiscoveredLight, LightHandle, LightTransport, TransportError};
use lifxctl_domain::address::{IpAddress, MacAddress};
use lifxctl_domain::color::Hsbk;

use crate::config::LanConfig;
use crate::error::LanError;
use crate::protocol::{self, MAX_PACKET};

/// Talks to LIFX bulbs on the local network.
///
/// Every transport picks a random `source` id; bulbs echo it back, which is
/// how replies to this process are told apart from other clients' traffic.
#[derive(Debug, Clone)]
pub struct LanTransport {
    config: Arc<LanConfig>,
    source: u32,
}

impl LanTransport {
    #[must_use]
    pub fn new(config: LanConfig) -> Self {
        // Sources 0 and 1 make bulbs broadcast their replies.
        let source = rand::random::<u32>().max(2);
        Self {
            config: Arc::new(config),
            source,
        }
    }

    #[must_use]
    pub fn config(&self) -> &LanConfig {
        &self.config
    }
}

impl LightTransport for LanTransport {
    type Handle = LanHandle;

    fn discover(&self) -> impl Future<Output = Result<Vec<DiscoveredLight>, TransportError>> + Send {
        discover(Arc::clone(&self.config), self.source)
    }

    fn connect(&self, id: MacAddress, address: IpAddress) -> LanHandle {
        LanHandle {
            id,
            address,
            config: Arc::clone(&self.config),
            source: self.source,
            sequence: AtomicU8::new(0),
            socket: Mutex::new(None),
        }
    }
}

#[tracing::instrument(skip(config), fields(broadcast = %config.broadcast, port = config.port))]
async fn discover(config: Arc<LanConfig>, source: u32) -> Result<Vec<DiscoveredLight>, TransportError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_broadcast(true)?;

    let options = BuildOptions {
        source,
        res_required: true,
        ..BuildOptions::default()
    };
    let packet = protocol::encode(Message::GetService, &options)?;
    let destination = SocketAddrV4::new(config.broadcast, config.port);
    for _ in 0..config.send_attempts.max(1) {
        socket.send_to(&packet, destination).await?;
    }

    let deadline = Instant::now() + config.discovery_timeout();
    let mut lights: Vec<DiscoveredLight> = Vec::new();
    let mut buf = [0u8; MAX_PACKET];
    loop {
        let (len, from) = match tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
            Ok(received) => received?,
            Err(_) => break,
        };
        let SocketAddr::V4(from) = from else {
            continue;
        };
        let reply = match protocol::decode(&buf[..len]) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::debug!(%err, %from, "ignoring datagram");
                continue;
            }
        };
        if reply.source != source || !matches!(reply.message, Message::StateService { .. }) {
            continue;
        }

        let id = MacAddress::from_target(reply.target);
        if lights.iter().any(|light| light.id == id) {
            continue;
        }
        tracing::debug!(%id, address = %from.ip(), "bulb answered");
        lights.push(DiscoveredLight {
            id,
            address: IpAddress::from(*from.ip()),
        });
    }
    Ok(lights)
}

/// Connection to a single bulb.
///
/// The UDP socket is bound on first use and re-bound by
/// [`LightHandle::refresh`].
#[derive(Debug)]
pub struct LanHandle {
    id: MacAddress,
    address: IpAddress,
    config: Arc<LanConfig>,
    source: u32,
    sequence: AtomicU8,
    socket: Mutex<Option<Arc<UdpSocket>>>,
}

impl LanHandle {
    fn destination(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address.as_ipv4(), self.config.port)
    }

    async fn socket(&self) -> Result<Arc<UdpSocket>, TransportError> {
        let mut slot = self.socket.lock().await;
        if let Some(socket) = slot.as_ref() {
            return Ok(Arc::clone(socket));
        }
        let socket = Arc::new(UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?);
        *slot = Some(Arc::clone(&socket));
        Ok(socket)
    }

    /// Send `message` and wait for the reply `accept` recognizes.
    ///
    /// The request is re-sent after each `request_timeout` without a reply,
    /// up to `send_attempts` times.
    async fn request<T>(
        &self,
        message: Message,
        expected: &'static str,
        accept: fn(Message) -> Result<T, Message>,
    ) -> Result<T, TransportError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let options = BuildOptions {
            target: Some(self.id.to_target()),
            res_required: true,
            sequence,
            source: self.source,
            ..BuildOptions::default()
        };
        let name = protocol::message_name(&message);
        let packet = protocol::encode(message, &options)?;
        let socket = self.socket().await?;
        let destination = self.destination();

        let attempts = self.config.send_attempts.max(1);
        for attempt in 1..=attempts {
            tracing::debug!(request = name, sequence, attempt, %destination, "sending");
            socket.send_to(&packet, destination).await?;
            let wait = self.config.request_timeout();
            match tokio::time::timeout(wait, self.receive(&socket, sequence)).await {
                Ok(reply) => {
                    return match accept(reply?) {
                        Ok(value) => Ok(value),
                        Err(other) => Err(LanError::UnexpectedReply {
                            expected,
                            got: protocol::message_name(&other).to_string(),
                        }
                        .into()),
                    };
                }
                Err(_) => tracing::debug!(request = name, sequence, attempt, "no reply"),
            }
        }
        Err(TransportError::Timeout {
            target: self.address.to_string(),
            attempts,
        })
    }

    /// Wait for the reply to `sequence`, skipping unrelated datagrams.
    async fn receive(&self, socket: &UdpSocket, sequence: u8) -> Result<Message, TransportError> {
        let mut buf = [0u8; MAX_PACKET];
        loop {
            let (len, from) = socket.recv_from(&mut buf).await?;
            let reply = match protocol::decode(&buf[..len]) {
                Ok(reply) => reply,
                Err(err) => {
                    tracing::debug!(%err, %from, "ignoring datagram");
                    continue;
                }
            };
            if reply.source != self.source || reply.sequence != sequence {
                tracing::debug!(%from, sequence = reply.sequence, "ignoring stale reply");
                continue;
            }
            if matches!(reply.message, Message::Acknowledgement { .. }) {
                continue;
            }
            return Ok(reply.message);
        }
    }
}

impl LightHandle for LanHandle {
    fn id(&self) -> MacAddress {
        self.id
    }

    fn address(&self) -> IpAddress {
        self.address
    }

    fn label(&self) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.request(Message::GetLabel, "StateLabel", |reply| match reply {
            Message::StateLabel { label } => Ok(label.to_string()),
            other => Err(other),
        })
    }

    fn power(&self) -> impl Future<Output = Result<bool, TransportError>> + Send {
        self.request(Message::LightGetPower, "LightStatePower", |reply| match reply {
            Message::LightStatePower { level } => Ok(level > 0),
            other => Err(other),
        })
    }

    fn set_power(&self, on: bool) -> impl Future<Output = Result<(), TransportError>> + Send {
        let message = Message::LightSetPower {
            level: protocol::power_level(on),
            duration: 0,
        };
        self.request(message, "LightStatePower", |reply| match reply {
            Message::LightStatePower { .. } => Ok(()),
            other => Err(other),
        })
    }

    fn color(&self) -> impl Future<Output = Result<Hsbk, TransportError>> + Send {
        self.request(Message::LightGet, "LightState", |reply| match reply {
            Message::LightState { color, .. } => Ok(protocol::from_wire(&color)),
            other => Err(other),
        })
    }

    fn set_color(&self, color: Hsbk) -> impl Future<Output = Result<(), TransportError>> + Send {
        let message = Message::LightSetColor {
            reserved: 0,
            color: protocol::to_wire(color),
            duration: 0,
        };
        self.request(message, "LightState", |reply| match reply {
            Message::LightState { .. } => Ok(()),
            other => Err(other),
        })
    }

    /// Re-bind the socket and check that the bulb answers at its address.
    fn refresh(&self) -> impl Future<Output = Result<(), TransportError>> + Send {
        async move {
            self.socket.lock().await.take();
            self.request(Message::GetService, "StateService", |reply| match reply {
                Message::StateService { .. } => Ok(()),
                other => Err(other),
            })
            .await
        }
    }
}
