//! Per-device message history.
//!
//! This is where per-device outcomes end up instead of being returned: every
//! request sent, every reply received and every transport or effect failure.

use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of message in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Send,
    Receive,
    Error,
}

/// A recorded message in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub msg_type: MessageType,
    /// Device the message went to or came from; `None` for session-level errors.
    pub address: Option<Ipv4Addr>,
    pub method: Option<String>,
    /// The JSON message, or the error text as a string.
    pub message: Value,
    /// Seconds since history creation
    pub timestamp: f64,
}

/// Bounded log of traffic and failures.
#[derive(Debug, Clone)]
pub struct MessageHistory {
    entries: VecDeque<HistoryEntry>,
    last_error: Option<String>,
    send_count: usize,
    receive_count: usize,
    error_count: usize,
    start_time: Instant,
    max_entries: usize,
}

impl Default for MessageHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHistory {
    pub const DEFAULT_MAX_ENTRIES: usize = 100;

    pub fn new() -> Self {
        Self::with_max_entries(Self::DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            last_error: None,
            send_count: 0,
            receive_count: 0,
            error_count: 0,
            start_time: Instant::now(),
            max_entries,
        }
    }

    pub fn record(&mut self, msg_type: MessageType, address: Ipv4Addr, message: &Value) {
        match msg_type {
            MessageType::Send => self.send_count += 1,
            MessageType::Receive => self.receive_count += 1,
            MessageType::Error => self.error_count += 1,
        }
        let method = message
            .get("method")
            .and_then(|m| m.as_str())
            .map(String::from);
        self.push(HistoryEntry {
            msg_type,
            address: Some(address),
            method,
            message: message.clone(),
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });
    }

    pub fn record_error(&mut self, address: Option<Ipv4Addr>, error: &str) {
        self.error_count += 1;
        self.last_error = Some(match address {
            Some(ip) => format!("{ip}: {error}"),
            None => error.to_string(),
        });
        self.push(HistoryEntry {
            msg_type: MessageType::Error,
            address,
            method: None,
            message: Value::String(error.to_string()),
            timestamp: self.start_time.elapsed().as_secs_f64(),
        });
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Entries involving one device, oldest first.
    pub fn for_address(&self, address: Ipv4Addr) -> Vec<HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.address == Some(address))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_error = None;
        self.send_count = 0;
        self.receive_count = 0;
        self.error_count = 0;
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            send_count: self.send_count,
            receive_count: self.receive_count,
            error_count: self.error_count,
            total_entries: self.entries.len(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Summary of message history for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySummary {
    pub send_count: usize,
    pub receive_count: usize,
    pub error_count: usize,
    pub total_entries: usize,
    pub last_error: Option<String>,
}
