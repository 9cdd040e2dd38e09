//! In-memory port implementations shared by the unit tests.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use lifxctl_domain::address::{IpAddress, MacAddress};
use lifxctl_domain::color::Hsbk;
use lifxctl_domain::device::DeviceRecord;
use lifxctl_domain::error::LifxCtlError;

use crate::ports::{DiscoveredLight, LightHandle, LightTransport, RegistryStore, TransportError};

pub(crate) fn record(mac: &str, name: &str, ip: &str) -> DeviceRecord {
    DeviceRecord::parse(mac, name, ip).unwrap()
}

pub(crate) fn ip(s: &str) -> IpAddress {
    s.parse().unwrap()
}

pub(crate) fn mac(s: &str) -> MacAddress {
    s.parse().unwrap()
}

#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    snapshot: Arc<Mutex<Vec<DeviceRecord>>>,
    saves: Arc<AtomicU32>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub(crate) fn with_devices(devices: Vec<DeviceRecord>) -> Self {
        let store = Self::default();
        *store.snapshot.lock().unwrap() = devices;
        store
    }

    pub(crate) fn snapshot(&self) -> Vec<DeviceRecord> {
        self.snapshot.lock().unwrap().clone()
    }

    pub(crate) fn saves(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl RegistryStore for InMemoryStore {
    fn load(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, LifxCtlError>> + Send {
        let devices = self.snapshot();
        async { Ok(devices) }
    }

    fn save(
        &self,
        devices: &[DeviceRecord],
    ) -> impl Future<Output = Result<(), LifxCtlError>> + Send {
        let result = if self.fail_saves.load(Ordering::SeqCst) {
            Err(LifxCtlError::Storage(Box::new(std::io::Error::other(
                "disk full",
            ))))
        } else {
            *self.snapshot.lock().unwrap() = devices.to_vec();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        };
        async { result }
    }
}

/// Observable state of the single simulated bulb.
#[derive(Debug, Default)]
pub(crate) struct BulbState {
    pub power: bool,
    pub color: Hsbk,
    /// Number of upcoming operations that time out.
    pub failures: u32,
    /// Forced value returned by `power()` regardless of what was set.
    pub power_readback: Option<bool>,
    /// Forced value returned by `color()` regardless of what was set.
    pub color_readback: Option<Hsbk>,
    pub calls: Vec<&'static str>,
    pub refreshes: u32,
}

/// A network with one bulb on it.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    bulb: Arc<Mutex<BulbState>>,
    answers_at: Arc<Mutex<Option<IpAddress>>>,
    announced: Arc<Mutex<Vec<DiscoveredLight>>>,
    fail_discovery: Arc<AtomicBool>,
    discover_calls: Arc<AtomicU32>,
    connects: Arc<Mutex<Vec<IpAddress>>>,
}

impl FakeTransport {
    pub(crate) fn bulb(&self) -> MutexGuard<'_, BulbState> {
        self.bulb.lock().unwrap()
    }

    /// Only handles built for `address` reach the bulb.
    pub(crate) fn answer_only_at(&self, address: IpAddress) {
        *self.answers_at.lock().unwrap() = Some(address);
    }

    /// Make `light` part of the next discovery results.
    pub(crate) fn announce(&self, light: DiscoveredLight) {
        self.announced.lock().unwrap().push(light);
    }

    pub(crate) fn fail_discovery(&self) {
        self.fail_discovery.store(true, Ordering::SeqCst);
    }

    pub(crate) fn discover_calls(&self) -> u32 {
        self.discover_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn connects(&self) -> Vec<IpAddress> {
        self.connects.lock().unwrap().clone()
    }

    pub(crate) fn handle(&self) -> FakeHandle {
        self.connect(mac("d0:73:d5:00:00:01"), ip("192.168.1.20"))
    }
}

impl LightTransport for FakeTransport {
    type Handle = FakeHandle;

    fn discover(
        &self,
    ) -> impl Future<Output = Result<Vec<DiscoveredLight>, TransportError>> + Send {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_discovery.load(Ordering::SeqCst) {
            Err(TransportError::Io(std::io::Error::other("network unreachable")))
        } else {
            Ok(self.announced.lock().unwrap().clone())
        };
        async { result }
    }

    fn connect(&self, id: MacAddress, address: IpAddress) -> FakeHandle {
        self.connects.lock().unwrap().push(address);
        let reachable = self
            .answers_at
            .lock()
            .unwrap()
            .is_none_or(|only| only == address);
        FakeHandle {
            id,
            address,
            reachable,
            bulb: Arc::clone(&self.bulb),
        }
    }
}

pub(crate) struct FakeHandle {
    id: MacAddress,
    address: IpAddress,
    reachable: bool,
    bulb: Arc<Mutex<BulbState>>,
}

impl FakeHandle {
    fn step(&self, call: &'static str) -> Result<MutexGuard<'_, BulbState>, TransportError> {
        let mut bulb = self.bulb.lock().unwrap();
        bulb.calls.push(call);
        if !self.reachable || bulb.failures > 0 {
            bulb.failures = bulb.failures.saturating_sub(1);
            return Err(TransportError::Timeout {
                target: self.address.to_string(),
                attempts: 1,
            });
        }
        Ok(bulb)
    }
}

impl LightHandle for FakeHandle {
    fn id(&self) -> MacAddress {
        self.id
    }

    fn address(&self) -> IpAddress {
        self.address
    }

    fn label(&self) -> impl Future<Output = Result<String, TransportError>> + Send {
        let result = self.step("label").map(|_| "Fake Bulb".to_string());
        async { result }
    }

    fn power(&self) -> impl Future<Output = Result<bool, TransportError>> + Send {
        let result = self
            .step("power")
            .map(|bulb| bulb.power_readback.unwrap_or(bulb.power));
        async { result }
    }

    fn set_power(&self, on: bool) -> impl Future<Output = Result<(), TransportError>> + Send {
        let result = self.step("set_power").map(|mut bulb| bulb.power = on);
        async { result }
    }

    fn color(&self) -> impl Future<Output = Result<Hsbk, TransportError>> + Send {
        let result = self
            .step("color")
            .map(|bulb| bulb.color_readback.unwrap_or(bulb.color));
        async { result }
    }

    fn set_color(&self, color: Hsbk) -> impl Future<Output = Result<(), TransportError>> + Send {
        let result = self.step("set_color").map(|mut bulb| bulb.color = color);
        async { result }
    }

    fn refresh(&self) -> impl Future<Output = Result<(), TransportError>> + Send {
        let result = {
            let mut bulb = self.bulb.lock().unwrap();
            bulb.refreshes += 1;
            if self.reachable {
                Ok(())
            } else {
                Err(TransportError::Io(std::io::Error::other("refresh failed")))
            }
        };
        async { result }
    }
}
