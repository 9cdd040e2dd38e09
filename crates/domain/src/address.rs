//! Network address value objects: the MAC identity of a bulb and its IPv4 address.
//!
//! Both types validate on construction, so a [`DeviceRecord`](crate::device::DeviceRecord)
//! can never hold a malformed address.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // literal pattern, covered by the tests below
    Regex::new(r"^([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}$").expect("MAC pattern must compile")
});

/// Whether `s` is six colon- or hyphen-separated groups of two hex digits.
#[must_use]
pub fn is_valid_mac(s: &str) -> bool {
    MAC_PATTERN.is_match(s)
}

/// Whether `s` is a dotted quad of 1–3 digit groups, each in `0..=255`.
#[must_use]
pub fn is_valid_ip(s: &str) -> bool {
    parse_octets(s).is_some()
}

fn parse_octets(s: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut groups = s.split('.');
    for slot in &mut octets {
        let group = groups.next()?;
        if group.is_empty() || group.len() > 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = group.parse::<u8>().ok()?;
    }
    if groups.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Hardware address of a bulb; the unique key of the registry.
///
/// Displayed (and persisted) in canonical lowercase, colon-separated form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    #[must_use]
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    #[must_use]
    pub const fn octets(self) -> [u8; 6] {
        self.0
    }

    /// Decode the 64-bit target field of a LIFX frame header.
    ///
    /// The MAC occupies the first six bytes in little-endian order; the two
    /// trailing bytes are always zero.
    #[must_use]
    pub fn from_target(target: u64) -> Self {
        let bytes = target.to_le_bytes();
        Self([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]])
    }

    /// Encode as the 64-bit target field of a LIFX frame header.
    #[must_use]
    pub fn to_target(self) -> u64 {
        let [a, b, c, d, e, f] = self.0;
        u64::from_le_bytes([a, b, c, d, e, f, 0, 0])
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_mac(s) {
            return Err(ValidationError::InvalidMac(s.to_string()));
        }
        let mut octets = [0u8; 6];
        for (slot, group) in octets.iter_mut().zip(s.split([':', '-'])) {
            *slot = u8::from_str_radix(group, 16)
                .map_err(|_| ValidationError::InvalidMac(s.to_string()))?;
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

/// Last known IPv4 address of a bulb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpAddress(Ipv4Addr);

impl IpAddress {
    #[must_use]
    pub const fn as_ipv4(self) -> Ipv4Addr {
        self.0
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for IpAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_octets(s)
            .map(|[a, b, c, d]| Self(Ipv4Addr::new(a, b, c, d)))
            .ok_or_else(|| ValidationError::InvalidIp(s.to_string()))
    }
}

impl TryFrom<String> for IpAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpAddress> for String {
    fn from(ip: IpAddress) -> Self {
        ip.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_colon_and_hyphen_separated_macs() {
        for mac in [
            "d0:73:d5:01:02:03",
            "D0:73:D5:AA:BB:CC",
            "d0-73-d5-01-02-03",
            "d0:73-d5:01-02:03",
        ] {
            assert!(is_valid_mac(mac), "{mac} should be valid");
        }
    }

    #[test]
    fn should_reject_macs_with_wrong_shape() {
        for mac in [
            "",
            "d0:73:d5:01:02",
            "d0:73:d5:01:02:03:04",
            "d0:73:d5:01:02:3",
            "d0:73:d5:01:02:003",
            "d0.73.d5.01.02.03",
            "d073d5010203",
            "g0:73:d5:01:02:03",
            " d0:73:d5:01:02:03",
        ] {
            assert!(!is_valid_mac(mac), "{mac:?} should be invalid");
        }
    }

    #[test]
    fn should_accept_dotted_quads_in_range() {
        for ip in ["0.0.0.0", "192.168.1.20", "255.255.255.255", "10.0.0.001"] {
            assert!(is_valid_ip(ip), "{ip} should be valid");
        }
    }

    #[test]
    fn should_reject_malformed_or_out_of_range_ips() {
        for ip in [
            "",
            "192.168.1",
            "192.168.1.1.1",
            "256.1.1.1",
            "1.1.1.1000",
            "a.b.c.d",
            "1..1.1",
            "-1.1.1.1",
            "1.1.1.1 ",
        ] {
            assert!(!is_valid_ip(ip), "{ip:?} should be invalid");
        }
    }

    #[test]
    fn should_canonicalize_mac_to_lowercase_colon_form() {
        let mac: MacAddress = "D0-73-D5-AA-BB-CC".parse().unwrap();
        assert_eq!(mac.to_string(), "d0:73:d5:aa:bb:cc");
    }

    #[test]
    fn should_return_validation_error_when_mac_is_malformed() {
        let result = "not-a-mac".parse::<MacAddress>();
        assert_eq!(
            result,
            Err(ValidationError::InvalidMac("not-a-mac".to_string()))
        );
    }

    #[test]
    fn should_roundtrip_mac_through_lifx_target() {
        let mac = MacAddress::new([0xd0, 0x73, 0xd5, 0x01, 0x02, 0x03]);
        let target = mac.to_target();
        assert_eq!(target & 0xff, 0xd0);
        assert_eq!(MacAddress::from_target(target), mac);
    }

    #[test]
    fn should_parse_ip_into_ipv4() {
        let ip: IpAddress = "192.168.1.20".parse().unwrap();
        assert_eq!(ip.as_ipv4(), Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(ip.to_string(), "192.168.1.20");
    }

    #[test]
    fn should_serialize_addresses_as_strings() {
        let mac: MacAddress = "d0:73:d5:01:02:03".parse().unwrap();
        assert_eq!(serde_json::to_string(&mac).unwrap(), "\"d0:73:d5:01:02:03\"");
        let ip: IpAddress = serde_json::from_str("\"10.0.0.7\"").unwrap();
        assert_eq!(ip.to_string(), "10.0.0.7");
    }

    #[test]
    fn should_fail_deserialization_when_ip_is_invalid() {
        let result = serde_json::from_str::<IpAddress>("\"10.0.0.300\"");
        assert!(result.is_err());
    }
}
