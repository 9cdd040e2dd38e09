//! Packet helpers on top of [`lifx_core`].

use lifx_core::{BuildOptions, HSBK, Message, RawMessage};

use lifxctl_domain::color::Hsbk;

use crate::error::LanError;

/// Largest datagram we expect from a bulb.
pub(crate) const MAX_PACKET: usize = 1024;

/// Frame, frame address and protocol header.
const HEADER_LEN: usize = 36;
const PROTOCOL: u16 = 1024;
const ADDRESSABLE: u16 = 0x1000;

/// A decoded datagram together with its routing header.
#[derive(Debug)]
pub(crate) struct Reply {
    pub source: u32,
    pub sequence: u8,
    pub target: u64,
    pub message: Message,
}

/// Build and pack `message`.
pub(crate) fn encode(message: Message, options: &BuildOptions) -> Result<Vec<u8>, LanError> {
    let name = message_name(&message);
    RawMessage::build(options, message)
        .and_then(|raw| raw.pack())
        .map_err(|err| LanError::Encode {
            message: name,
            reason: err.to_string(),
        })
}

/// Unpack a datagram.
///
/// The header is checked here first: [`RawMessage::unpack`] asserts on
/// malformed frames instead of returning an error.
pub(crate) fn decode(bytes: &[u8]) -> Result<Reply, LanError> {
    check_header(bytes)?;
    let raw = RawMessage::unpack(bytes).map_err(|err| LanError::Decode(err.to_string()))?;
    let message = Message::from_raw(&raw).map_err(|err| LanError::Decode(err.to_string()))?;
    Ok(Reply {
        source: raw.frame.source,
        sequence: raw.frame_addr.sequence,
        target: raw.frame_addr.target,
        message,
    })
}

fn check_header(bytes: &[u8]) -> Result<(), LanError> {
    let [size_lo, size_hi, flags_lo, flags_hi, ..] = *bytes else {
        return Err(LanError::Decode(format!("{} byte datagram", bytes.len())));
    };
    let size = usize::from(u16::from_le_bytes([size_lo, size_hi]));
    if bytes.len() < HEADER_LEN || size < HEADER_LEN || size > bytes.len() {
        return Err(LanError::Decode(format!(
            "frame size {size} does not fit a {} byte datagram",
            bytes.len()
        )));
    }
    let flags = u16::from_le_bytes([flags_lo, flags_hi]);
    if flags & 0x0fff != PROTOCOL || flags & ADDRESSABLE == 0 {
        return Err(LanError::Decode(format!("not a LIFX frame (flags {flags:#06x})")));
    }
    Ok(())
}

pub(crate) fn to_wire(color: Hsbk) -> HSBK {
    HSBK {
        hue: color.hue,
        saturation: color.saturation,
        brightness: color.brightness,
        kelvin: color.kelvin,
    }
}

pub(crate) fn from_wire(color: &HSBK) -> Hsbk {
    Hsbk {
        hue: color.hue,
        saturation: color.saturation,
        brightness: color.brightness,
        kelvin: color.kelvin,
    }
}

/// Power level a bulb uses for "on".
pub(crate) fn power_level(on: bool) -> u16 {
    if on { u16::MAX } else { 0 }
}

/// Name of the message variant, for logs and errors.
pub(crate) fn message_name(message: &Message) -> &'static str {
    match message {
        Message::GetService => "GetService",
        Message::StateService { .. } => "StateService",
        Message::GetLabel => "GetLabel",
        Message::StateLabel { .. } => "StateLabel",
        Message::LightGet => "LightGet",
        Message::LightState { .. } => "LightState",
        Message::LightSetColor { .. } => "LightSetColor",
        Message::LightGetPower => "LightGetPower",
        Message::LightSetPower { .. } => "LightSetPower",
        Message::LightStatePower { .. } => "LightStatePower",
        Message::Acknowledgement { .. } => "Acknowledgement",
        _ => "other message",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_decode_what_was_encoded_with_routing_header() {
        let options = BuildOptions {
            target: Some(0x0000_0302_01d5_73d0),
            res_required: true,
            sequence: 7,
            source: 0xdead_beef,
            ..BuildOptions::default()
        };

        let bytes = encode(Message::GetLabel, &options).unwrap();
        let reply = decode(&bytes).unwrap();

        assert_eq!(reply.source, 0xdead_beef);
        assert_eq!(reply.sequence, 7);
        assert_eq!(reply.target, 0x0000_0302_01d5_73d0);
        assert!(matches!(reply.message, Message::GetLabel));
    }

    #[test]
    fn should_reject_truncated_datagram() {
        let result = decode(&[0x24, 0x00, 0x00]);
        assert!(matches!(result, Err(LanError::Decode(_))));
    }

    #[test]
    fn should_reject_frame_larger_than_datagram() {
        let mut bytes = encode(Message::GetLabel, &BuildOptions::default()).unwrap();
        bytes.truncate(40.min(bytes.len() - 1));
        assert!(matches!(decode(&bytes), Err(LanError::Decode(_))));
    }

    #[test]
    fn should_reject_foreign_protocol_number() {
        let mut bytes = encode(Message::GetLabel, &BuildOptions::default()).unwrap();
        bytes[2] = 0x00;
        bytes[3] = 0x00;
        assert!(matches!(decode(&bytes), Err(LanError::Decode(_))));
    }

    #[test]
    fn should_carry_every_color_component_to_the_wire() {
        let color = Hsbk::new(1000, 2000, 3000, 2700).unwrap();
        let wire = to_wire(color);
        assert_eq!(
            [wire.hue, wire.saturation, wire.brightness, wire.kelvin],
            [1000, 2000, 3000, 2700]
        );
        assert_eq!(from_wire(&wire), color);
    }
}
