//! Dashboard telemetry.
//!
//! A thread-safe table of named values published by the subsystems and read
//! by whatever displays them. The table can be dumped as a JSON object for
//! the periodic status line.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

/// A single dashboard value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DashboardValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Cloneable handle to the shared dashboard table.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    values: Arc<Mutex<BTreeMap<String, DashboardValue>>>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_bool(&self, key: &str, value: bool) {
        self.put(key, DashboardValue::Bool(value));
    }

    pub fn put_number(&self, key: &str, value: f64) {
        self.put(key, DashboardValue::Number(value));
    }

    pub fn put_text(&self, key: &str, value: impl Into<String>) {
        self.put(key, DashboardValue::Text(value.into()));
    }

    fn put(&self, key: &str, value: DashboardValue) {
        let mut values = self.values.lock();
        match values.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                values.insert(key.to_owned(), value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<DashboardValue> {
        self.values.lock().get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            DashboardValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            DashboardValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Serialize the whole table as a JSON object (keys sorted).
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.values.lock())
    }
}
