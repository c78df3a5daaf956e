//! Best-effort command fan-out.

use std::net::Ipv4Addr;

use log::error;

use crate::errors::Error;
use crate::message::Request;
use crate::transport::Transport;
use crate::types::Command;

type Result<T> = std::result::Result<T, Error>;

/// Applies a [`Command`] to a list of devices, one `setState` datagram each,
/// in the order given.
///
/// Per-device outcomes are left to the [`Transport`] side channel; nothing is
/// aggregated into a verdict for the batch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: Transport,
}

impl Dispatcher {
    pub(crate) fn new(transport: Transport) -> Self {
        Dispatcher { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Send `command` to every target.
    pub async fn apply(&self, command: &Command, targets: &[Ipv4Addr]) {
        if let Err(e) = self.try_apply(command, targets).await {
            error!("could not build request for {command:?}: {e}");
        }
    }

    /// Like [`Dispatcher::apply`], but reports a request that cannot be built.
    ///
    /// Device silence and socket failures are still absorbed.
    pub async fn try_apply(&self, command: &Command, targets: &[Ipv4Addr]) -> Result<()> {
        let request = Request::set_state(command.to_params()).to_value()?;
        for ip in targets {
            self.transport.send(*ip, &request).await;
        }
        Ok(())
    }
}
