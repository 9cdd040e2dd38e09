//! LAN adapter error types.

use lifxctl_app::ports::TransportError;

/// Packet-level failures of the LAN adapter.
#[derive(Debug, thiserror::Error)]
pub enum LanError {
    /// A request could not be turned into a packet.
    #[error("cannot encode {message}: {reason}")]
    Encode {
        message: &'static str,
        reason: String,
    },

    /// A datagram addressed to us is not a valid LIFX packet.
    #[error("cannot decode reply: {0}")]
    Decode(String),

    /// The bulb answered our request with the wrong message.
    #[error("expected {expected}, got {got}")]
    UnexpectedReply { expected: &'static str, got: String },
}

impl From<LanError> for TransportError {
    fn from(err: LanError) -> Self {
        match err {
            LanError::UnexpectedReply { .. } => Self::UnexpectedReply(err.to_string()),
            LanError::Encode { .. } | LanError::Decode(_) => Self::Codec(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_unexpected_reply_to_transport_error() {
        let err: TransportError = LanError::UnexpectedReply {
            expected: "StateLabel",
            got: "LightStatePower".to_string(),
        }
        .into();
        assert!(matches!(err, TransportError::UnexpectedReply(_)));
        assert_eq!(
            err.to_string(),
            "unexpected reply: expected StateLabel, got LightStatePower"
        );
    }

    #[test]
    fn should_map_decode_failure_to_codec_error() {
        let err: TransportError = LanError::Decode("short packet".to_string()).into();
        assert!(matches!(err, TransportError::Codec(_)));
    }
}
