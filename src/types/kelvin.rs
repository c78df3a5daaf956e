//! Color temperature control.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin, from 2200K to 6500K.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Kelvin {
    pub const MIN: u16 = 2200;
    pub const MAX: u16 = 6500;

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Returns `None` if value is outside the valid range (2200-6500).
    pub fn create(kelvin: u16) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&kelvin) {
            Some(Kelvin { kelvin })
        } else {
            None
        }
    }

    /// Pins any integer into 2200-6500.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiz_rave::Kelvin;
    ///
    /// assert_eq!(Kelvin::clamped(1000).kelvin(), 2200);
    /// assert_eq!(Kelvin::clamped(4000).kelvin(), 4000);
    /// assert_eq!(Kelvin::clamped(9000).kelvin(), 6500);
    /// ```
    pub fn clamped(kelvin: i64) -> Self {
        let kelvin = kelvin.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Kelvin {
            kelvin: kelvin as u16,
        }
    }
}
