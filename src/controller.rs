//! The controller facade.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::info;
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogRecord};
use crate::config::ControllerConfig;
use crate::discovery::{self, Scanner};
use crate::dispatch::Dispatcher;
use crate::effect::EffectLoop;
use crate::errors::Error;
use crate::history::MessageHistory;
use crate::message::{PilotResponse, Request};
use crate::registry::DeviceRegistry;
use crate::runtime;
use crate::status::StatusPayload;
use crate::transport::{SharedHistory, Transport, lock_history};
use crate::types::{ColorSpec, Command, NamedColor};

type Result<T> = std::result::Result<T, Error>;

/// Discovers devices and drives them.
///
/// Every operation completes (or times out) before its future resolves.
/// Per-device failures never fail an operation: silence shows up as `None`
/// and socket errors land in [`Controller::history`]. At most one background
/// effect runs at a time.
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use wiz_rave::{Controller, ControllerConfig};
///
/// let ip = Ipv4Addr::new(192, 168, 1, 100);
/// let controller = Controller::with_devices([ip, ip], ControllerConfig::default());
/// assert_eq!(controller.devices(), vec![ip]);
/// ```
pub struct Controller {
    config: ControllerConfig,
    registry: Mutex<DeviceRegistry>,
    history: SharedHistory,
    dispatcher: Dispatcher,
    scanner: Scanner,
    effect: runtime::Mutex<EffectLoop>,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_devices(std::iter::empty(), config)
    }

    /// Create a controller that already knows some device addresses.
    pub fn with_devices<I: IntoIterator<Item = Ipv4Addr>>(
        addresses: I,
        config: ControllerConfig,
    ) -> Self {
        let history: SharedHistory = Arc::new(Mutex::new(MessageHistory::with_max_entries(
            config.history_limit,
        )));
        let transport = Transport::new(&config, Arc::clone(&history));
        let dispatcher = Dispatcher::new(transport);
        let effect = EffectLoop::new(dispatcher.clone(), Arc::clone(&history), config.stop_grace);
        Controller {
            scanner: Scanner::new(&config),
            registry: Mutex::new(DeviceRegistry::from_addresses(addresses)),
            history,
            dispatcher,
            effect: runtime::Mutex::new(effect),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn registry(&self) -> MutexGuard<'_, DeviceRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Known device addresses in discovery/add order.
    pub fn devices(&self) -> Vec<Ipv4Addr> {
        self.registry().addresses().to_vec()
    }

    /// Add a device by address. Returns false if it was already known.
    pub fn add_device(&self, address: Ipv4Addr) -> bool {
        self.registry().insert(address)
    }

    /// Last status observed from `address`.
    pub fn status_of(&self, address: Ipv4Addr) -> Option<StatusPayload> {
        self.registry().status(&address).cloned()
    }

    /// Every stored status.
    pub fn statuses(&self) -> HashMap<Ipv4Addr, StatusPayload> {
        self.registry().statuses().clone()
    }

    /// Snapshot of the side-channel history.
    pub fn history(&self) -> MessageHistory {
        lock_history(&self.history).clone()
    }

    pub fn clear_history(&self) {
        lock_history(&self.history).clear();
    }

    /// Discover devices on the /24 of the host's primary outbound address.
    ///
    /// Returns the addresses that were not known before, in the order their
    /// replies arrived; they are appended to the registry with their status.
    pub async fn discover(&self) -> Result<Vec<Ipv4Addr>> {
        let local = discovery::local_ipv4(self.config.probe_address).await?;
        self.discover_from(local).await
    }

    /// Like [`Controller::discover`] but scans the /24 around `local`.
    pub async fn discover_from(&self, local: Ipv4Addr) -> Result<Vec<Ipv4Addr>> {
        info!("scanning {local}/24 for devices");
        let known = self.devices();
        let found = self.scanner.scan(local, &known).await?;

        let mut registry = self.registry();
        let mut new = Vec::with_capacity(found.len());
        for device in found {
            if registry.insert(device.ip) {
                new.push(device.ip);
            }
            registry.update_status(device.ip, device.status);
        }
        Ok(new)
    }

    /// Query `address` for its current status and store it.
    ///
    /// `None` when the device is silent or its reply carries no `result`.
    pub async fn get_status(&self, address: Ipv4Addr) -> Option<StatusPayload> {
        let request = Request::get_pilot().to_value().ok()?;
        let reply = self.dispatcher.transport().send(address, &request).await?;
        let status = PilotResponse::status(reply)?;
        self.registry().update_status(address, status.clone());
        Some(status)
    }

    /// Apply one command to every target, best effort.
    pub async fn apply(&self, command: Command, targets: impl AsRef<[Ipv4Addr]>) {
        self.dispatcher.apply(&command, targets.as_ref()).await;
    }

    pub async fn set_power(&self, targets: impl AsRef<[Ipv4Addr]>, on: bool) {
        self.apply(Command::SetPower(on), targets).await;
    }

    /// Brightness in percent; clamped to 10-100.
    pub async fn set_brightness(&self, targets: impl AsRef<[Ipv4Addr]>, percent: i64) {
        self.apply(Command::brightness(percent), targets).await;
    }

    /// Set a color by name or RGB triple. See [`ColorSpec::resolve`].
    pub async fn set_color(&self, targets: impl AsRef<[Ipv4Addr]>, color: impl Into<ColorSpec>) {
        self.apply(color.into().resolve(), targets).await;
    }

    /// Color temperature in kelvin; clamped to 2200-6500.
    pub async fn set_temperature(&self, targets: impl AsRef<[Ipv4Addr]>, kelvin: i64) {
        self.apply(Command::temperature(kelvin), targets).await;
    }

    /// Start a background color effect, replacing any running one.
    pub async fn start_effect<S: AsRef<str>>(
        &self,
        targets: impl AsRef<[Ipv4Addr]>,
        interval: Duration,
        palette: &[S],
    ) -> Uuid {
        self.effect
            .lock()
            .await
            .start(targets.as_ref(), interval, palette)
            .await
    }

    /// Stop the background effect, if any.
    pub async fn stop_effect(&self) {
        self.effect.lock().await.stop().await;
    }

    pub async fn effect_running(&self) -> bool {
        self.effect.lock().await.is_running()
    }

    /// Number of live effect tasks, including abandoned ones.
    pub async fn effect_tasks(&self) -> usize {
        self.effect.lock().await.active_tasks()
    }

    /// Blink `address` red and blue `cycles` times so a person can tell
    /// which physical light it is.
    pub async fn identify(&self, address: Ipv4Addr, cycles: usize, pause: Duration) {
        for _ in 0..cycles {
            self.set_color([address], NamedColor::Red).await;
            runtime::sleep(pause).await;
            self.set_color([address], NamedColor::Blue).await;
            runtime::sleep(pause).await;
        }
    }

    /// Hand a named device to an external catalog.
    pub async fn catalog_device<C: Catalog>(
        &self,
        address: Ipv4Addr,
        name: &str,
        group: &str,
        catalog: &C,
    ) -> Result<CatalogRecord> {
        let record = CatalogRecord::new(name, group, address);
        catalog.register(&record).await?;
        info!("cataloged {address} as {:?} in {:?}", record.name, record.group);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tokio::net::UdpSocket as TokioUdpSocket;
    use tokio::sync::mpsc;

    /// Simulated bulb: answers `getPilot` with `{"result":{"state":true}}`,
    /// stays silent on everything else, and forwards every request it sees.
    async fn simulated_bulb() -> (u16, mpsc::UnboundedReceiver<Value>) {
        let device = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = device.local_addr().unwrap().port();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            while let Ok((n, from)) = device.recv_from(&mut buf).await {
                let Ok(msg) = serde_json::from_slice::<Value>(&buf[..n]) else {
                    continue;
                };
                if msg["method"] == "getPilot" {
                    let _ = device.send_to(br#"{"result":{"state":true}}"#, from).await;
                }
                let _ = tx.send(msg);
            }
        });
        (port, rx)
    }

    fn test_config(port: u16) -> ControllerConfig {
        ControllerConfig::default()
            .with_port(port)
            .with_request_timeout(Duration::from_millis(100))
            .with_discovery_window(Duration::from_millis(300))
            .with_receive_poll(Duration::from_millis(50))
    }

    const A: Ipv4Addr = Ipv4Addr::LOCALHOST;

    #[tokio::test]
    async fn test_status_query_is_stored() {
        let (port, _rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port));

        let status = controller.get_status(A).await.unwrap();
        assert_eq!(Value::from(status), json!({"state": true}));
        assert_eq!(
            controller.status_of(A).map(Value::from),
            Some(json!({"state": true}))
        );
    }

    #[tokio::test]
    async fn test_set_color_red_without_reply() {
        let (port, mut rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port));

        controller.set_color([A], "red").await;
        assert_eq!(
            rx.recv().await.unwrap(),
            json!({"method": "setState", "params": {"state": true, "r": 255, "g": 0, "b": 0}})
        );
        assert_eq!(controller.history().last_error(), None);
    }

    #[tokio::test]
    async fn test_socket_failure_does_not_stop_the_batch() {
        let (port, mut rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port));

        controller.set_power([Ipv4Addr::BROADCAST, A], false).await;
        assert_eq!(
            rx.recv().await.unwrap(),
            json!({"method": "setState", "params": {"state": false}})
        );

        let history = controller.history();
        assert!(history.last_error().is_some());
        assert!(
            history
                .for_address(Ipv4Addr::BROADCAST)
                .iter()
                .any(|e| e.msg_type == crate::history::MessageType::Error)
        );
    }

    #[tokio::test]
    async fn test_temperature_preset_through_set_color() {
        let (port, mut rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port));

        controller.set_color(vec![A], "Warm White").await;
        assert_eq!(
            rx.recv().await.unwrap(),
            json!({"method": "setState", "params": {"state": true, "temp": 2700}})
        );
    }

    #[tokio::test]
    async fn test_repeated_discovery_does_not_duplicate() {
        let (port, _rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port));

        let first = controller.discover_from(A).await.unwrap();
        assert_eq!(first, vec![A]);
        assert_eq!(
            controller.status_of(A).map(Value::from),
            Some(json!({"state": true}))
        );

        let second = controller.discover_from(A).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(controller.devices(), vec![A]);
    }

    #[tokio::test]
    async fn test_silent_subnet_leaves_registry_unchanged() {
        let idle = TokioUdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = idle.local_addr().unwrap().port();
        drop(idle);

        let seeded = Ipv4Addr::new(10, 9, 8, 7);
        let controller = Controller::with_devices([seeded], test_config(port));
        let found = controller.discover_from(A).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(controller.devices(), vec![seeded]);
        assert!(controller.statuses().is_empty());
    }

    #[tokio::test]
    async fn test_discovery_rejects_unusable_network() {
        let controller = Controller::new(test_config(9));
        let err = controller
            .discover_from(Ipv4Addr::UNSPECIFIED)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidNetwork { .. }));
        assert!(controller.devices().is_empty());
    }

    #[tokio::test]
    async fn test_second_effect_replaces_first() {
        let (port, _rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port));

        let first = controller
            .start_effect([A], Duration::from_millis(10), &["red"])
            .await;
        let second = controller
            .start_effect([A], Duration::from_millis(10), &["blue"])
            .await;
        assert_ne!(first, second);
        assert_eq!(controller.effect_tasks().await, 1);
        assert!(controller.effect_running().await);

        controller.stop_effect().await;
        assert!(!controller.effect_running().await);
        assert_eq!(controller.effect_tasks().await, 0);

        // Stopping again is a no-op.
        controller.stop_effect().await;
    }

    #[tokio::test]
    async fn test_identify_blinks_red_then_blue() {
        let (port, mut rx) = simulated_bulb().await;
        let controller = Controller::new(test_config(port).with_request_timeout(Duration::from_millis(10)));

        controller.identify(A, 1, Duration::from_millis(5)).await;
        assert_eq!(rx.recv().await.unwrap()["params"]["r"], json!(255));
        assert_eq!(rx.recv().await.unwrap()["params"]["b"], json!(255));
    }

    struct MemoryCatalog(Mutex<Vec<CatalogRecord>>, bool);

    impl Catalog for MemoryCatalog {
        async fn register(&self, record: &CatalogRecord) -> Result<()> {
            if !self.1 {
                return Err(Error::Catalog("read-only".into()));
            }
            self.0.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_catalog_hand_off() {
        let controller = Controller::new(ControllerConfig::default());
        let catalog = MemoryCatalog(Mutex::new(Vec::new()), true);

        let record = controller
            .catalog_device(A, "Desk", "Office", &catalog)
            .await
            .unwrap();
        assert_eq!(record.address, A);
        assert_eq!(catalog.0.lock().unwrap().as_slice(), &[record]);

        let refusing = MemoryCatalog(Mutex::new(Vec::new()), false);
        assert!(matches!(
            controller.catalog_device(A, "Desk", "Office", &refusing).await,
            Err(Error::Catalog(_))
        ));
    }
}
