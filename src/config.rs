//! Controller tunables.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and addressing knobs shared by every component of a
/// [`crate::Controller`].
///
/// The defaults match what real bulbs tolerate: a 2 second reply wait,
/// a 5 second discovery window polled every 500 ms, and a 2 second grace
/// period when stopping an effect.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use wiz_rave::ControllerConfig;
///
/// let config = ControllerConfig::default()
///     .with_discovery_window(Duration::from_secs(3))
///     .with_port(40000);
/// assert_eq!(config.port, 40000);
/// assert_eq!(config.request_timeout, Duration::from_secs(2));
/// ```
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    /// UDP port devices listen on.
    pub port: u16,
    /// How long [`crate::Controller::get_status`] and commands wait for a reply.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub request_timeout: Duration,
    /// Wall-clock length of the discovery receive phase.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub discovery_window: Duration,
    /// Per-receive timeout inside the discovery window.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub receive_poll: Duration,
    /// Upper bound on how long stopping an effect waits for the task.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub stop_grace: Duration,
    /// Connect target used only to learn the local outbound address.
    pub probe_address: SocketAddr,
    /// Receive buffer size in bytes. Zero means the default.
    pub buffer_size: usize,
    /// Maximum number of side-channel history entries.
    pub history_limit: usize,
}

impl ControllerConfig {
    pub const DEFAULT_PORT: u16 = 38899;
    pub const DEFAULT_BUFFER_SIZE: usize = 4096;

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_discovery_window(mut self, window: Duration) -> Self {
        self.discovery_window = window;
        self
    }

    pub fn with_receive_poll(mut self, poll: Duration) -> Self {
        self.receive_poll = poll;
        self
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn with_probe_address(mut self, probe: SocketAddr) -> Self {
        self.probe_address = probe;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Buffer size actually used for receives; a zero-length buffer would
    /// truncate every reply.
    pub fn receive_buffer_size(&self) -> usize {
        match self.buffer_size {
            0 => Self::DEFAULT_BUFFER_SIZE,
            size => size,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            port: Self::DEFAULT_PORT,
            request_timeout: Duration::from_secs(2),
            discovery_window: Duration::from_secs(5),
            receive_poll: Duration::from_millis(500),
            stop_grace: Duration::from_secs(2),
            probe_address: SocketAddr::from(([8, 8, 8, 8], 80)),
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            history_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_durations_serialize_as_millis() {
        let config = ControllerConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["requestTimeout"], json!(2000));
        assert_eq!(value["receivePoll"], json!(500));
        assert_eq!(value["port"], json!(38899));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ControllerConfig =
            serde_json::from_value(json!({"port": 12345, "discoveryWindow": 750})).unwrap();
        assert_eq!(config.port, 12345);
        assert_eq!(config.discovery_window, Duration::from_millis(750));
        assert_eq!(config.stop_grace, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_buffer_size_falls_back_to_default() {
        let config = ControllerConfig::default().with_buffer_size(0);
        assert_eq!(config.buffer_size, 0);
        assert_eq!(config.receive_buffer_size(), ControllerConfig::DEFAULT_BUFFER_SIZE);
        assert_eq!(ControllerConfig::default().with_buffer_size(512).receive_buffer_size(), 512);
    }
}
