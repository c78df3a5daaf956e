//! Known devices and their last observed status.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::status::StatusPayload;

/// Ordered, duplicate-free set of device addresses plus the latest status
/// seen from each.
///
/// Addresses keep insertion order and are never removed. Status entries may
/// exist for addresses that are not (yet) in the sequence.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    addresses: Vec<Ipv4Addr>,
    statuses: HashMap<Ipv4Addr, StatusPayload>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a seed list, dropping repeats.
    pub fn from_addresses<I: IntoIterator<Item = Ipv4Addr>>(addresses: I) -> Self {
        let mut registry = Self::new();
        registry.merge(addresses);
        registry
    }

    /// Append `address` unless already present. Returns true if it was new.
    pub fn insert(&mut self, address: Ipv4Addr) -> bool {
        if self.contains(&address) {
            return false;
        }
        self.addresses.push(address);
        true
    }

    /// Insert every address in order; returns the ones that were new.
    pub fn merge<I: IntoIterator<Item = Ipv4Addr>>(&mut self, addresses: I) -> Vec<Ipv4Addr> {
        addresses
            .into_iter()
            .filter(|ip| self.insert(*ip))
            .collect()
    }

    /// Overwrite the stored status for `address`.
    pub fn update_status(&mut self, address: Ipv4Addr, status: StatusPayload) {
        self.statuses.insert(address, status);
    }

    pub fn contains(&self, address: &Ipv4Addr) -> bool {
        self.addresses.contains(address)
    }

    pub fn addresses(&self) -> &[Ipv4Addr] {
        &self.addresses
    }

    pub fn status(&self, address: &Ipv4Addr) -> Option<&StatusPayload> {
        self.statuses.get(address)
    }

    pub fn statuses(&self) -> &HashMap<Ipv4Addr, StatusPayload> {
        &self.statuses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ip(last: u8) -> Ipv4Addr {
        Ipv4Addr::new(10, 0, 0, last)
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut registry = DeviceRegistry::new();
        assert!(registry.insert(ip(5)));
        assert!(!registry.insert(ip(5)));
        assert_eq!(registry.addresses(), &[ip(5)]);
    }

    #[test]
    fn test_merge_keeps_order_and_reports_new() {
        let mut registry = DeviceRegistry::from_addresses([ip(3), ip(1), ip(3)]);
        assert_eq!(registry.addresses(), &[ip(3), ip(1)]);

        let new = registry.merge([ip(2), ip(1), ip(9), ip(2)]);
        assert_eq!(new, vec![ip(2), ip(9)]);
        assert_eq!(registry.addresses(), &[ip(3), ip(1), ip(2), ip(9)]);
    }

    #[test]
    fn test_update_status_overwrites_without_growing_addresses() {
        let mut registry = DeviceRegistry::new();
        let first: StatusPayload = serde_json::from_value(json!({"state": false})).unwrap();
        let second: StatusPayload = serde_json::from_value(json!({"state": true})).unwrap();

        registry.update_status(ip(7), first);
        registry.update_status(ip(7), second.clone());
        assert_eq!(registry.status(&ip(7)), Some(&second));
        assert!(registry.is_empty());
    }
}
