use crate::error::ConversionError;
use ahash::AHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
struct Lease {
    token: u64,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct LeaseTable {
    leases: Mutex<AHashMap<String, Lease>>,
    next_token: AtomicU64,
}

/// Per-mind-map single-writer leases.
///
/// Clones share the same table, so every reconciler built from one
/// `ConversionLocks` excludes the others. A lease that outlives its TTL may be taken
/// over by the next conversion.
#[derive(Debug, Clone, Default)]
pub struct ConversionLocks {
    table: Arc<LeaseTable>,
}

impl ConversionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lease on `mind_map_id` for `ttl`, or fails if a live lease exists.
    pub fn acquire(
        &self,
        mind_map_id: &str,
        ttl: Duration,
    ) -> Result<ConversionLease, ConversionError> {
        let now = Instant::now();
        let mut leases = self
            .table
            .leases
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(held) = leases.get(mind_map_id) {
            if held.expires_at > now {
                return Err(ConversionError::ConversionInProgress(
                    mind_map_id.to_string(),
                ));
            }
            warn!(mind_map_id, token = held.token, "taking over expired conversion lease");
        }

        let token = self.table.next_token.fetch_add(1, Ordering::Relaxed);
        leases.insert(
            mind_map_id.to_string(),
            Lease {
                token,
                expires_at: now + ttl,
            },
        );
        debug!(mind_map_id, token, "conversion lease acquired");
        Ok(ConversionLease {
            table: Arc::clone(&self.table),
            mind_map_id: mind_map_id.to_string(),
            token,
        })
    }

    /// Whether a live lease is currently held on `mind_map_id`.
    pub fn is_held(&self, mind_map_id: &str) -> bool {
        let leases = self
            .table
            .leases
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        leases
            .get(mind_map_id)
            .is_some_and(|l| l.expires_at > Instant::now())
    }
}

/// Guard for a held lease; released on drop.
#[derive(Debug)]
pub struct ConversionLease {
    table: Arc<LeaseTable>,
    mind_map_id: String,
    token: u64,
}

impl ConversionLease {
    pub fn mind_map_id(&self) -> &str {
        &self.mind_map_id
    }
}

impl Drop for ConversionLease {
    fn drop(&mut self) {
        let mut leases = self
            .table
            .leases
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // A taken-over lease belongs to someone else now.
        if leases
            .get(&self.mind_map_id)
            .is_some_and(|l| l.token == self.token)
        {
            leases.remove(&self.mind_map_id);
        }
    }
}
