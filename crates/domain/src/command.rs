//! Commands — the closed set of operations a bulb can be asked to perform.
//!
//! A [`Command`] is parsed once from the CLI verb and its arguments; a value
//! of this type always carries parameters that passed validation.

use crate::color::{Hsbk, KELVIN_MAX, KELVIN_MIN};
use crate::error::ValidationError;

/// A validated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Power { on: bool },
    Brightness { level: u16 },
    Color(Hsbk),
    Status,
}

impl Command {
    /// Verbs accepted by [`Command::parse`].
    pub const VERBS: [&'static str; 5] = ["on", "off", "setBrightness", "setColor", "status"];

    /// Parse a CLI verb and its positional arguments.
    ///
    /// Extra trailing arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownCommand`] for an unknown verb,
    /// [`ValidationError::MissingArguments`] when too few arguments are given,
    /// and [`ValidationError::InvalidInteger`] / [`ValidationError::OutOfRange`]
    /// for bad numbers.
    pub fn parse<S: AsRef<str>>(verb: &str, args: &[S]) -> Result<Self, ValidationError> {
        match verb {
            "on" => Ok(Self::Power { on: true }),
            "off" => Ok(Self::Power { on: false }),
            "setBrightness" => {
                let [level, ..] = args else {
                    return Err(ValidationError::MissingArguments(
                        "brightness value (0-65535) required",
                    ));
                };
                let level = parse_u16("brightness", level.as_ref(), 0, u16::MAX)?;
                Ok(Self::Brightness { level })
            }
            "setColor" => {
                let [hue, saturation, brightness, kelvin, ..] = args else {
                    return Err(ValidationError::MissingArguments(
                        "color requires 4 values: hue (0-65535), saturation (0-65535), \
                         brightness (0-65535), kelvin (2500-9000)",
                    ));
                };
                let color = Hsbk::new(
                    parse_u16("hue", hue.as_ref(), 0, u16::MAX)?,
                    parse_u16("saturation", saturation.as_ref(), 0, u16::MAX)?,
                    parse_u16("brightness", brightness.as_ref(), 0, u16::MAX)?,
                    parse_u16("kelvin", kelvin.as_ref(), KELVIN_MIN, KELVIN_MAX)?,
                )?;
                Ok(Self::Color(color))
            }
            "status" => Ok(Self::Status),
            other => Err(ValidationError::UnknownCommand(other.to_string())),
        }
    }

    /// The CLI verb that produces this command.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Power { on: true } => "on",
            Self::Power { on: false } => "off",
            Self::Brightness { .. } => "setBrightness",
            Self::Color(_) => "setColor",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

fn parse_u16(field: &'static str, raw: &str, min: u16, max: u16) -> Result<u16, ValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidInteger(raw.to_string()))?;
    if value < i64::from(min) || value > i64::from(max) {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min: i64::from(min),
            max: i64::from(max),
        });
    }
    u16::try_from(value).map_err(|_| ValidationError::InvalidInteger(raw.to_string()))
}

/// Power and color of a bulb, as read back by the `status` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStatus {
    pub power: bool,
    pub color: Hsbk,
}
