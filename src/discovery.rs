//! Device discovery by unicast sweep of the local /24.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::{debug, info};

use crate::config::ControllerConfig;
use crate::errors::Error;
use crate::message::{PilotResponse, Request};
use crate::runtime::{self, AsyncUdpSocket, Instant, UdpSocket};
use crate::status::StatusPayload;

type Result<T> = std::result::Result<T, Error>;

/// A device that answered a discovery sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredDevice {
    /// Source address of the reply
    pub ip: Ipv4Addr,
    /// The `result` document of the reply
    pub status: StatusPayload,
}

impl DiscoveredDevice {
    /// MAC address, when the device reported one.
    pub fn mac(&self) -> Option<&str> {
        self.status.mac()
    }
}

/// Learn the host's primary outbound IPv4 address.
///
/// Connecting a UDP socket sends nothing; it only makes the kernel pick the
/// route and source address toward `probe`.
pub async fn local_ipv4(probe: SocketAddr) -> Result<Ipv4Addr> {
    let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))
        .await
        .map_err(|_| Error::NoLocalAddress)?;
    socket
        .connect(probe)
        .await
        .map_err(|_| Error::NoLocalAddress)?;
    match socket.local_addr() {
        Ok(SocketAddr::V4(v4)) if !v4.ip().is_unspecified() => Ok(*v4.ip()),
        _ => Err(Error::NoLocalAddress),
    }
}

/// Every host address of the /24 containing `local`, i.e. `x.y.z.1` through
/// `x.y.z.254`.
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use wiz_rave::subnet_hosts;
///
/// let hosts = subnet_hosts(Ipv4Addr::new(192, 168, 1, 42)).unwrap();
/// assert_eq!(hosts.len(), 254);
/// assert_eq!(hosts[0], Ipv4Addr::new(192, 168, 1, 1));
/// assert_eq!(hosts[253], Ipv4Addr::new(192, 168, 1, 254));
/// ```
pub fn subnet_hosts(local: Ipv4Addr) -> Result<Vec<Ipv4Addr>> {
    if local.is_unspecified() {
        return Err(Error::invalid_network(&local, "unspecified address"));
    }
    if local.is_broadcast() {
        return Err(Error::invalid_network(&local, "broadcast address"));
    }
    if local.is_multicast() {
        return Err(Error::invalid_network(&local, "multicast address"));
    }
    let [a, b, c, _] = local.octets();
    Ok((1..=254).map(|d| Ipv4Addr::new(a, b, c, d)).collect())
}

/// Sweeps a /24 with status queries and collects replies for a fixed window.
#[derive(Debug, Clone)]
pub struct Scanner {
    port: u16,
    window: Duration,
    receive_poll: Duration,
    buffer_size: usize,
}

impl Scanner {
    pub fn new(config: &ControllerConfig) -> Self {
        Scanner {
            port: config.port,
            window: config.discovery_window,
            receive_poll: config.receive_poll,
            buffer_size: config.receive_buffer_size(),
        }
    }

    /// Scan the /24 around `local` and return devices not listed in `known`,
    /// in the order their first reply arrived.
    ///
    /// Zero replies is a successful, empty scan. Sends that fail, replies that
    /// are not status documents and repeat replies from one source are
    /// ignored.
    pub async fn scan(&self, local: Ipv4Addr, known: &[Ipv4Addr]) -> Result<Vec<DiscoveredDevice>> {
        let hosts = subnet_hosts(local)?;

        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))
            .await
            .map_err(|e| Error::socket("bind", e))?;

        let msg = serde_json::to_vec(&Request::get_pilot()).map_err(Error::JsonDump)?;

        let mut failed = 0usize;
        for host in &hosts {
            if socket
                .send_to(&msg, SocketAddr::from((*host, self.port)))
                .await
                .is_err()
            {
                failed += 1;
            }
        }
        debug!(
            "sent status query to {} hosts around {local} ({failed} sends failed)",
            hosts.len()
        );

        let mut seen: HashSet<Ipv4Addr> = known.iter().copied().collect();
        let mut discovered = Vec::new();
        let mut buffer = vec![0u8; self.buffer_size];
        let start = Instant::now();

        while start.elapsed() < self.window {
            let poll = self.receive_poll.min(self.window.saturating_sub(start.elapsed()));
            match runtime::timeout(poll, socket.recv_from(&mut buffer)).await {
                Ok(Ok((size, addr))) => {
                    let IpAddr::V4(ip) = addr.ip() else { continue };
                    if seen.contains(&ip) {
                        continue;
                    }
                    let Some(status) = parse_status(&buffer[..size]) else {
                        debug!("ignoring malformed discovery reply from {ip}");
                        continue;
                    };
                    info!("discovered device at {ip}");
                    seen.insert(ip);
                    discovered.push(DiscoveredDevice { ip, status });
                }
                Ok(Err(e)) => debug!("discovery receive error: {e}"),
                // Poll elapsed - loop to check the overall window
                Err(_) => continue,
            }
        }

        info!("discovery complete, found {} new device(s)", discovered.len());
        Ok(discovered)
    }
}

fn parse_status(datagram: &[u8]) -> Option<StatusPayload> {
    let text = std::str::from_utf8(datagram).ok()?;
    let reply = serde_json::from_str(text).ok()?;
    PilotResponse::status(reply)
}
