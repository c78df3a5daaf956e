//! Device state changes.

use std::str::FromStr;

use crate::message::StateParams;
use crate::types::{Brightness, Color, Kelvin, NamedColor, TemperaturePreset};

/// A single desired state change, applied by [`crate::Controller::apply`].
///
/// Values inside a `Command` are already normalized; build them through the
/// clamping constructors or through [`ColorSpec::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetPower(bool),
    SetBrightness(Brightness),
    SetColor(Color),
    SetColorTemperature(Kelvin),
}

impl Command {
    pub fn brightness(percent: i64) -> Self {
        Command::SetBrightness(Brightness::clamped(percent))
    }

    pub fn color(red: i64, green: i64, blue: i64) -> Self {
        Command::SetColor(Color::clamped(red, green, blue))
    }

    pub fn temperature(kelvin: i64) -> Self {
        Command::SetColorTemperature(Kelvin::clamped(kelvin))
    }

    /// The `setState` parameters for this command.
    ///
    /// Every command except a power change also switches the light on.
    pub fn to_params(&self) -> StateParams {
        let mut params = StateParams::default();
        match self {
            Command::SetPower(on) => params.state = Some(*on),
            Command::SetBrightness(b) => {
                params.state = Some(true);
                params.dimming = Some(b.value());
            }
            Command::SetColor(c) => {
                params.state = Some(true);
                params.red = Some(c.red());
                params.green = Some(c.green());
                params.blue = Some(c.blue());
            }
            Command::SetColorTemperature(k) => {
                params.state = Some(true);
                params.temp = Some(k.kelvin());
            }
        }
        params
    }
}

/// What the color entry point accepts: a name or an RGB triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    Named(String),
    Rgb(i64, i64, i64),
}

impl ColorSpec {
    /// Turn this spec into the command that should be sent.
    ///
    /// White presets ("warm white", "neutral", ...) become a temperature
    /// command. Unknown names fall back to white.
    ///
    /// # Examples
    ///
    /// ```
    /// use wiz_rave::{Color, ColorSpec, Command, Kelvin};
    ///
    /// assert_eq!(
    ///     ColorSpec::from("neutral").resolve(),
    ///     Command::SetColorTemperature(Kelvin::create(4000).unwrap())
    /// );
    /// assert_eq!(
    ///     ColorSpec::from("chartreuse").resolve(),
    ///     Command::SetColor(Color::rgb(255, 255, 255))
    /// );
    /// ```
    pub fn resolve(&self) -> Command {
        match self {
            ColorSpec::Named(name) => {
                if let Ok(preset) = TemperaturePreset::from_str(name) {
                    return Command::SetColorTemperature(preset.kelvin());
                }
                let named = NamedColor::from_str(name).unwrap_or(NamedColor::White);
                Command::SetColor(named.color())
            }
            ColorSpec::Rgb(r, g, b) => Command::color(*r, *g, *b),
        }
    }
}

impl From<&str> for ColorSpec {
    fn from(name: &str) -> Self {
        ColorSpec::Named(name.to_string())
    }
}

impl From<String> for ColorSpec {
    fn from(name: String) -> Self {
        ColorSpec::Named(name)
    }
}

impl From<(i64, i64, i64)> for ColorSpec {
    fn from((r, g, b): (i64, i64, i64)) -> Self {
        ColorSpec::Rgb(r, g, b)
    }
}

impl From<Color> for ColorSpec {
    fn from(color: Color) -> Self {
        ColorSpec::Rgb(
            i64::from(color.red()),
            i64::from(color.green()),
            i64::from(color.blue()),
        )
    }
}

impl From<NamedColor> for ColorSpec {
    fn from(color: NamedColor) -> Self {
        ColorSpec::from(color.color())
    }
}
