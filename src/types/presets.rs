//! Named colors and white-temperature presets.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::types::{Color, Kelvin};

/// Color names understood by [`crate::Controller::set_color`] and effect palettes.
///
/// Parsing is ASCII case-insensitive.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Pink,
    Orange,
    Cyan,
    White,
}

impl NamedColor {
    pub fn color(&self) -> Color {
        match self {
            NamedColor::Red => Color::rgb(255, 0, 0),
            NamedColor::Green => Color::rgb(0, 255, 0),
            NamedColor::Blue => Color::rgb(0, 0, 255),
            NamedColor::Yellow => Color::rgb(255, 255, 0),
            NamedColor::Purple => Color::rgb(128, 0, 128),
            NamedColor::Pink => Color::rgb(255, 192, 203),
            NamedColor::Orange => Color::rgb(255, 165, 0),
            NamedColor::Cyan => Color::rgb(0, 255, 255),
            NamedColor::White => Color::rgb(255, 255, 255),
        }
    }

    pub fn all() -> Vec<NamedColor> {
        NamedColor::iter().collect()
    }
}

/// White presets that arrive through the color entry point but are applied
/// as a color temperature.
#[derive(
    Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TemperaturePreset {
    #[strum(serialize = "warm white")]
    WarmWhite,
    #[strum(serialize = "soft white")]
    SoftWhite,
    #[strum(serialize = "neutral")]
    Neutral,
    #[strum(serialize = "cool white")]
    CoolWhite,
    #[strum(serialize = "daylight")]
    Daylight,
}

impl TemperaturePreset {
    pub fn kelvin(&self) -> Kelvin {
        let kelvin = match self {
            TemperaturePreset::WarmWhite => 2700,
            TemperaturePreset::SoftWhite => 3000,
            TemperaturePreset::Neutral => 4000,
            TemperaturePreset::CoolWhite => 5000,
            TemperaturePreset::Daylight => 6500,
        };
        Kelvin::clamped(kelvin)
    }

    pub fn all() -> Vec<TemperaturePreset> {
        TemperaturePreset::iter().collect()
    }
}
