//! Single request/reply exchange with one device.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;

use crate::config::ControllerConfig;
use crate::errors::Error;
use crate::history::{MessageHistory, MessageType};
use crate::runtime::{self, AsyncUdpSocket, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// History shared between the transport, the controller and effect tasks.
pub(crate) type SharedHistory = Arc<Mutex<MessageHistory>>;

pub(crate) fn lock_history(history: &SharedHistory) -> MutexGuard<'_, MessageHistory> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sends one JSON datagram and waits a bounded time for one JSON reply.
///
/// Silence and undecodable replies are normal and come back as `None`.
/// Socket failures also come back as `None`, after being logged and recorded
/// in the shared [`MessageHistory`].
#[derive(Debug, Clone)]
pub struct Transport {
    port: u16,
    request_timeout: Duration,
    buffer_size: usize,
    history: SharedHistory,
}

impl Transport {
    pub(crate) fn new(config: &ControllerConfig, history: SharedHistory) -> Self {
        Transport {
            port: config.port,
            request_timeout: config.request_timeout,
            buffer_size: config.receive_buffer_size(),
            history,
        }
    }

    #[cfg(test)]
    pub(crate) fn history_handle(&self) -> SharedHistory {
        Arc::clone(&self.history)
    }

    /// Send `request` to `address` and return the decoded reply, if any.
    pub async fn send(&self, address: Ipv4Addr, request: &Value) -> Option<Value> {
        lock_history(&self.history).record(MessageType::Send, address, request);

        match self.exchange(address, request).await {
            Ok(reply) => {
                lock_history(&self.history).record(MessageType::Receive, address, &reply);
                Some(reply)
            }
            Err(e) if e.is_expected() => {
                debug!("{address}: {e}");
                None
            }
            Err(e) => {
                warn!("error sending to {address}: {e}");
                lock_history(&self.history).record_error(Some(address), &e.to_string());
                None
            }
        }
    }

    async fn exchange(&self, address: Ipv4Addr, request: &Value) -> Result<Value> {
        let msg = serde_json::to_vec(request).map_err(Error::JsonDump)?;

        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))
            .await
            .map_err(|e| Error::socket("bind", e))?;

        socket
            .connect(SocketAddr::from((address, self.port)))
            .await
            .map_err(|e| Error::socket("connect", e))?;

        socket
            .send(&msg)
            .await
            .map_err(|e| Error::socket("send", e))?;

        let mut buffer = vec![0u8; self.buffer_size];
        let bytes = match runtime::timeout(self.request_timeout, socket.recv(&mut buffer)).await {
            Ok(Ok(bytes)) => bytes,
            // A refused port on a connected socket means nobody is listening.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                return Err(Error::NoResponse(address));
            }
            Ok(Err(e)) => return Err(Error::socket("receive", e)),
            Err(_) => return Err(Error::NoResponse(address)),
        };

        let response = String::from_utf8(buffer[..bytes].to_vec()).map_err(Error::Utf8Decode)?;
        serde_json::from_str(&response).map_err(Error::JsonLoad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::UdpSocket as TokioUdpSocket;

    fn transport(port: u16) -> Transport {
        transport_with(ControllerConfig::default().with_port(port))
    }

    fn transport_with(config: ControllerConfig) -> Transport {
        let config = config.with_request_timeout(Duration::from_millis(200));
        Transport::new(&config, Arc::new(Mutex::new(MessageHistory::new())))
    }

    async fn answering_device() -> u16 {
        let device = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let (_, from) = device.recv_from(&mut buf).await.unwrap();
            device
                .send_to(br#"{"result":{"state":false}}"#, from)
                .await
                .unwrap();
        });
        port
    }

    #[tokio::test]
    async fn test_reply_is_decoded() {
        let t = transport(answering_device().await);
        let reply = t
            .send(Ipv4Addr::LOCALHOST, &json!({"method": "getPilot", "params": {}}))
            .await;
        assert_eq!(reply, Some(json!({"result": {"state": false}})));
        assert_eq!(lock_history(&t.history).summary().receive_count, 1);
    }

    #[tokio::test]
    async fn test_silence_is_none_not_error() {
        let device = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();

        let t = transport(port);
        let reply = t.send(Ipv4Addr::LOCALHOST, &json!({"method": "setState"})).await;
        assert_eq!(reply, None);
        assert_eq!(lock_history(&t.history).last_error(), None);
        drop(device);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_none() {
        let device = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let (_, from) = device.recv_from(&mut buf).await.unwrap();
            device.send_to(b"not json {", from).await.unwrap();
        });

        let t = transport(port);
        let reply = t.send(Ipv4Addr::LOCALHOST, &json!({"method": "getPilot"})).await;
        assert_eq!(reply, None);
        assert_eq!(lock_history(&t.history).last_error(), None);
    }

    #[tokio::test]
    async fn test_zero_buffer_size_still_decodes() {
        let port = answering_device().await;
        let t = transport_with(ControllerConfig::default().with_port(port).with_buffer_size(0));
        let reply = t
            .send(Ipv4Addr::LOCALHOST, &json!({"method": "getPilot", "params": {}}))
            .await;
        assert_eq!(reply, Some(json!({"result": {"state": false}})));
    }

    #[tokio::test]
    async fn test_socket_failure_is_none_and_recorded() {
        // Connecting to the broadcast address without SO_BROADCAST is refused
        // by the OS before anything is sent.
        let t = transport(ControllerConfig::DEFAULT_PORT);
        let reply = t.send(Ipv4Addr::BROADCAST, &json!({"method": "getPilot"})).await;
        assert_eq!(reply, None);

        let history = lock_history(&t.history);
        assert!(history.last_error().is_some());
        assert_eq!(history.summary().receive_count, 0);
        let errors: Vec<_> = history
            .entries()
            .into_iter()
            .filter(|e| e.msg_type == MessageType::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].address, Some(Ipv4Addr::BROADCAST));
    }
}
