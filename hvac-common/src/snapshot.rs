use alloc::collections::BTreeMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Raw property map as reported by the device, keyed by property code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSnapshot(BTreeMap<CompactString, i64>);

impl DeviceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: &str) -> Option<i64> {
        self.0.get(code).copied()
    }

    pub fn insert(&mut self, code: impl Into<CompactString>, value: i64) -> Option<i64> {
        self.0.insert(code.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<CompactString>> FromIterator<(K, i64)> for DeviceSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
