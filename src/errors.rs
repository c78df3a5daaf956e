use std::{net::Ipv4Addr, string::FromUtf8Error};

/// All error types that can occur while discovering or driving lights.
///
/// Only the discovery-domain variants ([`Error::NoLocalAddress`],
/// [`Error::InvalidNetwork`]) and catalog rejections ever reach a caller of
/// [`crate::Controller`]. Everything per-device is absorbed into the
/// [`crate::MessageHistory`] side channel and surfaces as `None`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The host's primary outbound IPv4 address could not be determined.
    #[error("could not determine the local IPv4 address")]
    NoLocalAddress,

    /// The scan network could not be derived from the local address.
    #[error("cannot derive a /24 network from {address}: {reason}")]
    InvalidNetwork { address: Ipv4Addr, reason: String },

    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A network socket operation failed while communicating with a device.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// The UDP reply from a device contained invalid UTF-8.
    #[error("utf8 decoding error: {0:?}")]
    Utf8Decode(FromUtf8Error),

    /// No reply datagram arrived within the request timeout.
    #[error("no response from {0}")]
    NoResponse(Ipv4Addr),

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),

    /// The external catalog refused a record.
    #[error("catalog rejected record: {0}")]
    Catalog(String),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new invalid network error
    pub fn invalid_network(address: &Ipv4Addr, reason: &str) -> Self {
        Error::InvalidNetwork {
            address: *address,
            reason: reason.to_string(),
        }
    }

    /// True for outcomes that are normal on an unreliable medium: silence
    /// and undecodable replies.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Error::NoResponse(_) | Error::JsonLoad(_) | Error::Utf8Decode(_)
        )
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
