//! Sliding-window rate limiting over an injected attempt store.
//!
//! Tracks per-action timestamp logs and rejects an action once the count
//! within the trailing window reaches the limit. Throttling is advisory:
//! the store is client-local, the read-modify-write is not atomic across
//! concurrent callers, and any storage failure degrades to "no history"
//! rather than blocking the action. Do not treat a pass here as a security
//! boundary.

use crate::error::{AquaError, Result};
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// Action keys
// ---------------------------------------------------------------------------

/// Well-known action keys used by the storefront flows.
pub mod actions {
    pub const ORDER_CREATION: &str = "order_creation";
    pub const LOGIN_ATTEMPTS: &str = "login_attempts";
    pub const SIGNUP_ATTEMPTS: &str = "signup_attempts";
}

/// Stored keys carry a namespace prefix so the attempt table can share a
/// store with other consumers.
const KEY_PREFIX: &str = "ratelimit_";

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub limited: bool,
    /// Whole seconds until the window frees up. Always set when `limited`.
    pub retry_after_secs: Option<u64>,
}

impl Decision {
    fn allowed() -> Self {
        Self {
            limited: false,
            retry_after_secs: None,
        }
    }

    fn limited(retry_after_secs: u64) -> Self {
        Self {
            limited: true,
            retry_after_secs: Some(retry_after_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// AttemptStore
// ---------------------------------------------------------------------------

/// Key-value capability backing the limiter. Injected explicitly so tests
/// run against in-memory state instead of an ambient shared store.
pub trait AttemptStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn store(&self, key: &str, value: &[u8]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store for tests and single-shot tools.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = match self.entries.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = match self.entries.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AttemptDb
// ---------------------------------------------------------------------------

/// Key: namespaced action key ("ratelimit_order_creation")
/// Value: JSON-encoded array of epoch-millisecond timestamps
const ATTEMPTS: TableDefinition<&str, &[u8]> = TableDefinition::new("attempts");

/// Persistent attempt store backed by redb, so throttling survives across
/// CLI invocations.
pub struct AttemptDb {
    db: Database,
}

impl AttemptDb {
    /// Open or create the attempt database at `path`.
    ///
    /// Creates the `attempts` table if it doesn't already exist.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path).map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        // Ensure the table exists before any reads
        let wt = db
            .begin_write()
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        wt.open_table(ATTEMPTS)
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        wt.commit()
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        Ok(Self { db })
    }
}

impl AttemptStore for AttemptDb {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let rt = self
            .db
            .begin_read()
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        let table = rt
            .open_table(ATTEMPTS)
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        let value = table
            .get(key)
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?
            .map(|v| v.value().to_vec());
        Ok(value)
    }

    fn store(&self, key: &str, value: &[u8]) -> Result<()> {
        let wt = self
            .db
            .begin_write()
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        {
            let mut table = wt
                .open_table(ATTEMPTS)
                .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
            table
                .insert(key, value)
                .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        }
        wt.commit()
            .map_err(|e| AquaError::AttemptDb(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RateLimiter
// ---------------------------------------------------------------------------

pub struct RateLimiter {
    store: Box<dyn AttemptStore>,
}

impl RateLimiter {
    pub fn new(store: Box<dyn AttemptStore>) -> Self {
        Self { store }
    }

    /// Check and record an occurrence of `action` against the current clock.
    ///
    /// Allows up to `limit` occurrences per trailing `window_ms`. An allowed
    /// check appends the current timestamp and persists the pruned log; a
    /// limited check records nothing and reports how long to wait.
    pub fn check(&self, action: &str, limit: usize, window_ms: i64) -> Decision {
        self.check_at(action, limit, window_ms, Utc::now().timestamp_millis())
    }

    /// Clock-explicit variant of [`check`](Self::check), for deterministic
    /// tests that advance `now_ms` manually.
    pub fn check_at(&self, action: &str, limit: usize, window_ms: i64, now_ms: i64) -> Decision {
        let key = format!("{KEY_PREFIX}{action}");

        // Absent, unreadable, or corrupt history all degrade to "no prior
        // attempts" (fail-open). Preserved deliberately; see DESIGN.md.
        let logs: Vec<i64> = match self.store.load(&key) {
            Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(action, error = %e, "corrupt attempt log, treating as empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(action, error = %e, "attempt store read failed, treating as empty");
                Vec::new()
            }
        };

        // Drop entries that have aged out of the window. Pruning only happens
        // here, when the action key is next evaluated.
        let mut active: Vec<i64> = logs.into_iter().filter(|&t| now_ms - t < window_ms).collect();

        if active.len() >= limit {
            // limit is positive by contract, so active is non-empty here.
            let oldest = active.first().copied().unwrap_or(now_ms);
            let remaining_ms = window_ms - (now_ms - oldest);
            let retry_after_secs = ((remaining_ms.max(0) + 999) / 1000) as u64;
            tracing::warn!(action, retry_after_secs, "rate limit exceeded");
            return Decision::limited(retry_after_secs);
        }

        active.push(now_ms);
        let bytes = match serde_json::to_vec(&active) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(action, error = %e, "failed to encode attempt log");
                return Decision::allowed();
            }
        };
        if let Err(e) = self.store.store(&key, &bytes) {
            tracing::warn!(action, error = %e, "attempt store write failed, attempt not recorded");
        }
        Decision::allowed()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
