//! Value types for light control parameters.

mod brightness;
mod color;
mod command;
mod kelvin;
mod presets;

pub use brightness::Brightness;
pub use color::Color;
pub use command::{ColorSpec, Command};
pub use kelvin::Kelvin;
pub use presets::{NamedColor, TemperaturePreset};
