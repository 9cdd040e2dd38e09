//! HSBK color — the native color representation of LIFX bulbs.

use crate::error::ValidationError;

/// Lowest color temperature a command may request, in kelvin.
pub const KELVIN_MIN: u16 = 2500;
/// Highest color temperature a command may request, in kelvin.
pub const KELVIN_MAX: u16 = 9000;

/// Hue, saturation, brightness (all `0..=65535`) and color temperature in kelvin.
///
/// Values reported by a bulb are taken as-is; values built through
/// [`Hsbk::new`] are range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl Hsbk {
    /// Build a commanded color.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] when `kelvin` is outside
    /// [`KELVIN_MIN`]..=[`KELVIN_MAX`].
    pub fn new(hue: u16, saturation: u16, brightness: u16, kelvin: u16) -> Result<Self, ValidationError> {
        if !(KELVIN_MIN..=KELVIN_MAX).contains(&kelvin) {
            return Err(ValidationError::OutOfRange {
                field: "kelvin",
                value: i64::from(kelvin),
                min: i64::from(KELVIN_MIN),
                max: i64::from(KELVIN_MAX),
            });
        }
        Ok(Self {
            hue,
            saturation,
            brightness,
            kelvin,
        })
    }

    /// Same color with a different brightness.
    #[must_use]
    pub fn with_brightness(self, brightness: u16) -> Self {
        Self { brightness, ..self }
    }

    /// Components in `[hue, saturation, brightness, kelvin]` order.
    #[must_use]
    pub fn components(self) -> [u16; 4] {
        [self.hue, self.saturation, self.brightness, self.kelvin]
    }

    /// Whether every component of `self` is within `tolerance` of `target`.
    #[must_use]
    pub fn is_close_to(self, target: Self, tolerance: u16) -> bool {
        self.components()
            .into_iter()
            .zip(target.components())
            .all(|(actual, wanted)| actual.abs_diff(wanted) <= tolerance)
    }
}

impl std::fmt::Display for Hsbk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hue={} saturation={} brightness={} kelvin={}",
            self.hue, self.saturation, self.brightness, self.kelvin
        )
    }
}
