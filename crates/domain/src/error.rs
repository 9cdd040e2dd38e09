//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`LifxCtlError`] via `#[from]` at port boundaries.

/// Umbrella error for registry and domain operations.
#[derive(Debug, thiserror::Error)]
pub enum LifxCtlError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),

    /// Persistence failure raised by a storage adapter.
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Malformed user input: addresses, names, command parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("device name must not be empty")]
    EmptyName,

    #[error("invalid MAC address format: {0}")]
    InvalidMac(String),

    #[error("invalid IP address format: {0}")]
    InvalidIp(String),

    #[error("invalid integer value: {0}")]
    InvalidInteger(String),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Not enough positional arguments for a command.
    #[error("{0}")]
    MissingArguments(&'static str),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

/// A lookup by key found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Another device already uses this name (compared case-insensitively).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device name '{name}' already exists")]
pub struct DuplicateNameError {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_out_of_range_with_bounds() {
        let err = ValidationError::OutOfRange {
            field: "kelvin",
            value: 2000,
            min: 2500,
            max: 9000,
        };
        assert_eq!(err.to_string(), "kelvin must be between 2500 and 9000, got 2000");
    }

    #[test]
    fn should_display_duplicate_name() {
        let err = DuplicateNameError {
            name: "Lamp1".to_string(),
        };
        assert_eq!(err.to_string(), "device name 'Lamp1' already exists");
    }

    #[test]
    fn should_forward_validation_message_through_umbrella() {
        let err: LifxCtlError = ValidationError::InvalidIp("1.2.3".to_string()).into();
        assert_eq!(err.to_string(), "invalid IP address format: 1.2.3");
        assert!(matches!(err, LifxCtlError::Validation(_)));
    }

    #[test]
    fn should_display_not_found() {
        let err = NotFoundError {
            entity: "Device",
            id: "d0:73:d5:01:02:03".to_string(),
        };
        assert_eq!(err.to_string(), "Device 'd0:73:d5:01:02:03' not found");
    }
}
