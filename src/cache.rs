//! Cached table reads with stale fallback
//!
//! Full-worksheet fetches are expensive against the store's request quota,
//! so each table's last successful snapshot is kept for a fixed freshness
//! window. A rate-limited fetch falls back to the previous snapshot instead
//! of failing; any other failure surfaces as an error with an empty record
//! set. `invalidate` is the manual refresh hook.
//!
//! Per table the entry is either ABSENT or PRESENT(fetched-at, snapshot);
//! a fetch moves it to PRESENT, a rate-limited fetch leaves it untouched,
//! invalidation moves every entry back to ABSENT.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::store::{RecordSet, SheetStore};

/// Default freshness window, matching the store's per-minute quota.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// How a table read was satisfied.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadStatus {
    /// Fetched from the store on this call.
    Live,
    /// Served from a snapshot still inside the freshness window.
    Cached,
    /// The store rate-limited the fetch; this is the previous snapshot.
    Degraded { warning: String },
    /// The fetch failed and no fallback applied; the record set is empty.
    Failed { error: String },
}

/// Result of a cached table read.
#[derive(Debug, Clone)]
pub struct TableRead {
    pub records: RecordSet,
    pub status: ReadStatus,
}

impl TableRead {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ReadStatus::Degraded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ReadStatus::Failed { .. })
    }

    /// Warning or error message, if the read was not clean.
    pub fn problem(&self) -> Option<&str> {
        match &self.status {
            ReadStatus::Degraded { warning } => Some(warning),
            ReadStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

struct CacheEntry {
    records: RecordSet,
    fetched_at: Instant,
}

/// Process-wide snapshot cache keyed by table name.
pub struct TableCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Read a table, serving the cached snapshot while it is fresh.
    ///
    /// The lock is only held to inspect or replace entries, never across
    /// the store call.
    pub async fn read(&self, store: &dyn SheetStore, table: &str) -> TableRead {
        if let Some(records) = self.fresh_snapshot(table) {
            return TableRead {
                records,
                status: ReadStatus::Cached,
            };
        }

        match store.records(table).await {
            Ok(records) => {
                self.entries.lock().insert(
                    table.to_string(),
                    CacheEntry {
                        records: records.clone(),
                        fetched_at: Instant::now(),
                    },
                );
                TableRead {
                    records,
                    status: ReadStatus::Live,
                }
            }
            Err(e) if e.is_rate_limited() => {
                let previous = self
                    .entries
                    .lock()
                    .get(table)
                    .map(|entry| entry.records.clone());
                match previous {
                    Some(records) => {
                        let warning =
                            format!("Rate limited; showing cached data for '{}'", table);
                        log::warn!("{}", warning);
                        TableRead {
                            records,
                            status: ReadStatus::Degraded { warning },
                        }
                    }
                    None => {
                        let error = format!("Rate limited and no cached data for '{}'", table);
                        log::error!("{}", error);
                        TableRead {
                            records: RecordSet::default(),
                            status: ReadStatus::Failed { error },
                        }
                    }
                }
            }
            Err(e) => {
                let error = format!("Failed to read '{}': {}", table, e);
                log::error!("{}", error);
                TableRead {
                    records: RecordSet::default(),
                    status: ReadStatus::Failed { error },
                }
            }
        }
    }

    /// Drop every entry; the next read of each table hits the store.
    pub fn invalidate(&self) {
        self.entries.lock().clear();
        log::info!("Table cache invalidated");
    }

    fn fresh_snapshot(&self, table: &str) -> Option<RecordSet> {
        let entries = self.entries.lock();
        entries
            .get(table)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.records.clone())
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
