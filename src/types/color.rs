//! RGB color representation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::Error;

/// An RGB color with red, green, and blue components (0-255 each).
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
}

impl Color {
    /// Create a color with the given RGB values.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a color from arbitrary integers, pinning each channel into 0-255.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiz_rave::Color;
    ///
    /// assert_eq!(Color::clamped(-20, 128, 999), Color::rgb(0, 128, 255));
    /// ```
    pub fn clamped(red: i64, green: i64, blue: i64) -> Self {
        Self::rgb(clamp_channel(red), clamp_channel(green), clamp_channel(blue))
    }

    /// A uniformly random color.
    pub fn random() -> Self {
        Self::rgb(fastrand::u8(..), fastrand::u8(..), fastrand::u8(..))
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

impl FromStr for Color {
    type Err = Error;

    /// Parse from comma-separated string (e.g., "255,128,0"). Channels out of
    /// range are clamped.
    fn from_str(s: &str) -> Result<Self, Error> {
        let parts = s
            .split(',')
            .map(|c| c.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidColorString(s.to_string()))?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self::clamped(*r, *g, *b)),
            _ => Err(Error::InvalidColorString(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_clamp_law() {
        for input in -400..400 {
            let c = Color::clamped(input, input, input);
            let expected = input.clamp(0, 255) as u8;
            assert_eq!(c, Color::rgb(expected, expected, expected));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Color::from_str("255,128,0").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(Color::from_str(" 1, 2 ,300").unwrap(), Color::rgb(1, 2, 255));
        assert_eq!(
            Color::from_str("1,2"),
            Err(Error::InvalidColorString("1,2".into()))
        );
        assert!(Color::from_str("a,b,c").is_err());
    }
}
