//! Hand-off of named devices to an external catalog.

use std::future::Future;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// What the catalog receives once a human has named a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    #[serde(rename = "lightname")]
    pub name: String,
    pub group: String,
    #[serde(rename = "ipaddress")]
    pub address: Ipv4Addr,
}

impl CatalogRecord {
    pub fn new(name: &str, group: &str, address: Ipv4Addr) -> Self {
        CatalogRecord {
            name: name.trim().to_string(),
            group: group.trim().to_string(),
            address,
        }
    }
}

/// An external store of named devices. Implementations decide the transport
/// (HTTP, file, ...); a refusal is reported as [`Error::Catalog`].
pub trait Catalog {
    fn register(&self, record: &CatalogRecord) -> impl Future<Output = Result<(), Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_wire_shape() {
        let record = CatalogRecord::new(" Desk lamp ", "Office", Ipv4Addr::new(192, 168, 0, 12));
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"lightname": "Desk lamp", "group": "Office", "ipaddress": "192.168.0.12"})
        );
    }
}
