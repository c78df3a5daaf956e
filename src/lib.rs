//! # wiz_rave
//!
//! Find Wiz smart lights on the local network and drive them over UDP.
//!
//! Devices speak a small JSON request/reply protocol on UDP port 38899. This
//! crate covers three things:
//!
//! - **Discovery**: sweep every host of the local /24 with a status query and
//!   collect whoever answers within a fixed window ([`Controller::discover`]).
//! - **Commands**: power, brightness, RGB color, named colors and white
//!   temperature presets, fanned out best-effort to any set of devices
//!   ([`Controller::apply`] and friends).
//! - **Effects**: a cancellable background task that keeps recoloring a set
//!   of devices at a fixed interval ([`Controller::start_effect`]).
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use wiz_rave::{Controller, ControllerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wiz_rave::Error> {
//!     let controller = Controller::new(ControllerConfig::default());
//!     let found = controller.discover().await?;
//!
//!     controller.set_color(&found, "red").await;
//!     controller.set_brightness(&found, 60).await;
//!
//!     controller.start_effect(&found, Duration::from_millis(500), &["red", "blue"]).await;
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     controller.stop_effect().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Datagrams get lost and most addresses on a subnet never answer, so
//! per-device failures are not errors here. A device that does not reply
//! yields `None`; socket failures are logged through the [`log`] facade and
//! recorded in the [`MessageHistory`] returned by [`Controller::history`].
//! Only discovery's inability to work out its own network is returned as an
//! [`Error`].

mod catalog;
mod config;
mod controller;
mod discovery;
mod dispatch;
mod effect;
mod errors;
mod history;
mod message;
mod registry;
pub mod runtime;
mod status;
mod transport;
mod types;

// Re-export public API
pub use catalog::{Catalog, CatalogRecord};
pub use config::ControllerConfig;
pub use controller::Controller;
pub use discovery::{DiscoveredDevice, Scanner, local_ipv4, subnet_hosts};
pub use dispatch::Dispatcher;
pub use effect::EffectLoop;
pub use errors::Error;
pub use history::{HistoryEntry, HistorySummary, MessageHistory, MessageType};
pub use message::{Method, Request, StateParams};
pub use registry::DeviceRegistry;
pub use status::StatusPayload;
pub use transport::Transport;
pub use types::{
    Brightness, Color, ColorSpec, Command, Kelvin, NamedColor, TemperaturePreset,
};
