/// Per-session value history, keyed by cell path

use indexmap::IndexMap;

/// Append-only record of the distinct values each cell has shown.
///
/// Keys keep the order in which they were first recorded. A value is only
/// appended when it is non-empty and differs from the key's last entry, so
/// consecutive repeats collapse but a value can reappear later. Nothing is
/// evicted; the ledger lives as long as the session that owns it.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    entries: IndexMap<String, Vec<String>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` under `key`. Returns true if it was appended.
    pub fn append(&mut self, key: &str, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        if self.last(key) == Some(value) {
            return false;
        }

        self.entries
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
        true
    }

    /// Recorded values for one key, oldest first.
    pub fn entries(&self, key: &str) -> &[String] {
        self.entries.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn last(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.last()).map(|s| s.as_str())
    }

    /// Every key and its values, in key insertion order.
    pub fn all_entries(&self) -> &IndexMap<String, Vec<String>> {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Number of keys recorded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total values recorded across all keys.
    pub fn total_values(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }
}
