//! API Key Pool Management
//!
//! Manages the credential pool for one upstream service and implements the
//! rotation policy: least-used first, subject to a minimum spacing window,
//! with a least-recently-used fallback when every key is inside the window.

use parking_lot::Mutex;

/// Minimum rest time before a key becomes eligible for reselection again
pub const DEFAULT_MIN_SPACING_MS: u64 = 1_000;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn epoch_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// A single API key with usage bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// The actual API key value
    key: String,

    /// Total number of dispatches attempted with this key
    usage_count: u64,

    /// Epoch milliseconds of the most recent dispatch (0 = never used,
    /// which makes a fresh key immediately eligible)
    last_used_at: u64,
}

impl CredentialRecord {
    fn new(key: String) -> Self {
        Self {
            key,
            usage_count: 0,
            last_used_at: 0,
        }
    }

    /// Get the key value
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the dispatch count
    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    /// Get the last-used timestamp in epoch milliseconds
    pub fn last_used_at(&self) -> u64 {
        self.last_used_at
    }
}

/// Pool of API keys for a single upstream service
///
/// Counters reflect dispatch attempts, not confirmed upstream successes: a
/// key is marked used at selection time, before the outbound call is issued.
#[derive(Debug)]
pub struct KeyPool {
    /// Service display name this pool belongs to
    service: String,

    /// Spacing window in milliseconds
    min_spacing_ms: u64,

    /// Credential records, in original configuration order
    records: Mutex<Vec<CredentialRecord>>,
}

impl KeyPool {
    /// Create a new key pool with the default spacing window
    pub fn new(service: impl Into<String>, keys: Vec<String>) -> Self {
        Self::with_spacing(service, keys, DEFAULT_MIN_SPACING_MS)
    }

    /// Create a new key pool with a custom spacing window
    pub fn with_spacing(
        service: impl Into<String>,
        keys: Vec<String>,
        min_spacing_ms: u64,
    ) -> Self {
        Self {
            service: service.into(),
            min_spacing_ms,
            records: Mutex::new(keys.into_iter().map(CredentialRecord::new).collect()),
        }
    }

    /// Get the service name
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Check if the pool has no keys
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Get the number of keys in the pool
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Read-only selection: returns a snapshot of the record the policy
    /// would pick at `now_ms`, without mutating any counters. Calling this
    /// repeatedly without marking usage returns the same record.
    pub fn select_at(&self, now_ms: u64) -> Option<CredentialRecord> {
        let records = self.records.lock();
        pick_index(&records, now_ms, self.min_spacing_ms).map(|i| records[i].clone())
    }

    /// Record a dispatch against a specific key: usage count +1 and
    /// last-used set to `now_ms`. Unknown keys are ignored.
    pub fn mark_used_at(&self, key: &str, now_ms: u64) {
        let mut records = self.records.lock();
        if let Some(record) = records.iter_mut().find(|r| r.key == key) {
            record.usage_count += 1;
            record.last_used_at = now_ms;
        }
    }

    /// Select a key and mark it used, as one atomic unit under the pool
    /// lock. Concurrent dispatches therefore never double-pick the same
    /// under-used key. Returns `None` when the pool is empty.
    pub fn acquire_at(&self, now_ms: u64) -> Option<String> {
        let mut records = self.records.lock();
        let idx = pick_index(&records, now_ms, self.min_spacing_ms)?;
        records[idx].usage_count += 1;
        records[idx].last_used_at = now_ms;
        Some(records[idx].key.clone())
    }

    /// Select and mark a key using the current wall clock
    pub fn acquire(&self) -> Option<String> {
        self.acquire_at(epoch_ms())
    }

    /// Get statistics about the pool
    pub fn stats(&self) -> KeyPoolStats {
        let records = self.records.lock();
        KeyPoolStats {
            total_keys: records.len(),
            total_requests: records.iter().map(|r| r.usage_count).sum(),
        }
    }
}

/// Apply the rotation policy over the records at `now_ms`.
///
/// 1. Stable-sort by usage count, ties keeping original pool order.
/// 2. First record resting strictly longer than the spacing window wins.
/// 3. Otherwise the least-recently-used record, ties by original order.
fn pick_index(records: &[CredentialRecord], now_ms: u64, min_spacing_ms: u64) -> Option<usize> {
    if records.is_empty() {
        return None;
    }

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| records[i].usage_count);

    for &i in &order {
        if now_ms.saturating_sub(records[i].last_used_at) > min_spacing_ms {
            return Some(i);
        }
    }

    (0..records.len()).min_by_key(|&i| records[i].last_used_at)
}

/// Statistics about a key pool
#[derive(Debug, Clone)]
pub struct KeyPoolStats {
    /// Number of keys configured for the service
    pub total_keys: usize,
    /// Sum of dispatch attempts across all keys
    pub total_requests: u64,
}
