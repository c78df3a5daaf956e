//! Brightness control.

use serde::{Deserialize, Serialize};

/// Brightness level from 10 to 100 percent.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 100;

    /// Full brightness.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside valid range (10-100).
    pub fn create(value: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Brightness { value })
        } else {
            None
        }
    }

    /// Pins any integer into 10-100.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiz_rave::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(-5).value(), 10);
    /// assert_eq!(Brightness::clamped(55).value(), 55);
    /// assert_eq!(Brightness::clamped(250).value(), 100);
    /// ```
    pub fn clamped(value: i64) -> Self {
        let value = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Brightness { value: value as u8 }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}
