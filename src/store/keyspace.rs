//! Key Space
//!
//! One identity's storage engine: a flat key/value mapping with optional
//! per-key expiry and a wholesale JSON snapshot.
//!
//! ## Concurrency Model
//!
//! All mutable state sits behind a single synchronous `Mutex`, taken only
//! for non-awaiting sections:
//! - Command handlers lock once per command, so read-modify-write commands
//!   (INCR/DECR, SET replacing a timed key) are atomic with respect to every
//!   other command and to expiry wake-ups on the same key space.
//! - Expiry tasks hold no lock while sleeping; they interleave with commands
//!   only across that suspension point.
//!
//! Invariant: at most one live expiry task per key. Every write path that
//! touches a timed key cancels the pending task before installing new state,
//! and a wake-up that lost such a race revalidates its deadline under the
//! lock before deleting anything.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

use super::{snapshot, Stored, WrongType};

// =============================================================================
// Key Space
// =============================================================================

/// Isolated storage engine for one peer identity
pub struct KeySpace {
    /// The identity this key space is scoped to
    identity: String,
    /// Snapshot file this space saves to and loads from
    snapshot_path: PathBuf,
    /// All mutable state, guarded by one short-lived lock
    state: Mutex<SpaceState>,
}

#[derive(Default)]
struct SpaceState {
    /// Stored value per key
    entries: HashMap<String, Stored>,
    /// Absolute expiry instant per timed key
    deadlines: HashMap<String, Instant>,
    /// The one live expiry task per timed key
    reapers: HashMap<String, JoinHandle<()>>,
}

impl KeySpace {
    /// Snapshot file name prefix.
    const SNAPSHOT_PREFIX: &'static str = "space_";

    /// Open the key space for `identity`, loading its snapshot if one
    /// exists under `data_dir`.
    ///
    /// A missing, unreadable, or malformed snapshot means the space starts
    /// empty; opening never fails. Restored keys are all permanent, since
    /// TTL bookkeeping never reaches the snapshot.
    pub fn open(identity: impl Into<String>, data_dir: &Path) -> KeySpace {
        let identity = identity.into();
        let snapshot_path = data_dir.join(format!("{}{}.json", Self::SNAPSHOT_PREFIX, identity));

        let entries = snapshot::load(&snapshot_path).unwrap_or_default();
        if !entries.is_empty() {
            tracing::info!(
                "restored {} keys for {} from {}",
                entries.len(),
                identity,
                snapshot_path.display()
            );
        }

        KeySpace {
            identity,
            snapshot_path,
            state: Mutex::new(SpaceState {
                entries,
                ..SpaceState::default()
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the value stored under `key`, if any
    pub fn get(&self, key: &str) -> Option<Stored> {
        self.state.lock().entries.get(key).cloned()
    }

    /// Count how many of `keys` currently hold a value. Duplicates count
    /// once per occurrence.
    pub fn exists(&self, keys: &[String]) -> i64 {
        let state = self.state.lock();
        keys.iter()
            .filter(|key| state.entries.contains_key(key.as_str()))
            .count() as i64
    }

    /// The inclusive `[start, end]` slice of the list under `key`.
    ///
    /// Out-of-range requests (negative positions, start past the tail, end
    /// before start) read as empty, never as an error; an end past the tail
    /// is clamped to it. An absent key reads as an empty list.
    pub fn range(&self, key: &str, start: i64, end: i64) -> Result<Vec<String>, WrongType> {
        let state = self.state.lock();
        let list = match state.entries.get(key) {
            None => return Ok(Vec::new()),
            Some(Stored::List(list)) => list,
            Some(Stored::Text(_)) => return Err(WrongType),
        };

        if start < 0 || end < start || start >= list.len() as i64 {
            return Ok(Vec::new());
        }
        let start = start as usize;
        let end = (end as usize).min(list.len() - 1);
        Ok(list[start..=end].to_vec())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `value` under `key` with no expiry, replacing any previous
    /// value and cancelling any pending expiry for the key.
    pub fn set_text(&self, key: &str, value: &str) {
        let mut state = self.state.lock();
        state.cancel_reaper(key);
        state.deadlines.remove(key);
        state.entries.insert(key.to_string(), Stored::Text(value.to_string()));
    }

    /// Store `value` under `key` and schedule its removal once `ttl` has
    /// elapsed.
    ///
    /// Any previous value and pending expiry are replaced, so at most one
    /// expiry task is ever live per key. A `ttl` beyond what the clock can
    /// represent saturates to a deadline so distant it never fires.
    pub fn set_text_with_ttl(self: Arc<Self>, key: &str, value: &str, ttl: Duration) {
        let deadline = Instant::now()
            .checked_add(ttl)
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(86400 * 365 * 30));
        let mut state = self.state.lock();

        state.cancel_reaper(key);
        state.entries.insert(key.to_string(), Stored::Text(value.to_string()));
        state.deadlines.insert(key.to_string(), deadline);

        let space = Arc::clone(&self);
        let reap_key = key.to_string();
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            space.reap(&reap_key, deadline);
        });
        state.reapers.insert(key.to_string(), handle);
    }

    /// Remove each of `keys`, returning how many held a value.
    ///
    /// Removing a timed key cancels its pending expiry, leaving the slot
    /// clean for any later write.
    pub fn del(&self, keys: &[String]) -> i64 {
        let mut state = self.state.lock();
        let mut removed = 0;
        for key in keys {
            if state.entries.remove(key).is_some() {
                removed += 1;
            }
            state.deadlines.remove(key);
            state.cancel_reaper(key);
        }
        removed
    }

    /// Adjust the integer stored under `key` by `delta`, writing the result
    /// back as text and returning it.
    ///
    /// An absent key counts from zero. `None` means the current value does
    /// not parse as a base-10 signed integer (lists never do), or the
    /// adjustment overflowed. A timed key keeps its expiry.
    pub fn adjust(&self, key: &str, delta: i64) -> Option<i64> {
        let mut state = self.state.lock();
        let current = match state.entries.get(key) {
            None => 0,
            Some(Stored::Text(text)) => text.parse::<i64>().ok()?,
            Some(Stored::List(_)) => return None,
        };
        let next = current.checked_add(delta)?;
        state.entries.insert(key.to_string(), Stored::Text(next.to_string()));
        Some(next)
    }

    /// Insert each of `values` in turn at the head of the list under `key`,
    /// creating the list if absent. Pushing `a, b, c` leaves `c, b, a`
    /// ahead of any prior elements. Returns the resulting length.
    pub fn push_front(&self, key: &str, values: &[String]) -> Result<usize, WrongType> {
        let mut state = self.state.lock();
        let list = state.list_entry(key)?;
        for value in values {
            list.insert(0, value.clone());
        }
        Ok(list.len())
    }

    /// Append `values` in argument order to the list under `key`, creating
    /// the list if absent. Returns the resulting length.
    pub fn push_back(&self, key: &str, values: &[String]) -> Result<usize, WrongType> {
        let mut state = self.state.lock();
        let list = state.list_entry(key)?;
        list.extend(values.iter().cloned());
        Ok(list.len())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the full mapping to this identity's snapshot file, replacing
    /// any previous snapshot. Expiry state is deliberately excluded.
    pub fn save(&self) -> crate::Result<()> {
        let state = self.state.lock();
        snapshot::save(&self.snapshot_path, &state.entries)?;
        tracing::debug!(
            "saved {} keys for {} to {}",
            state.entries.len(),
            self.identity,
            self.snapshot_path.display()
        );
        Ok(())
    }

    // =========================================================================
    // Expiry
    // =========================================================================

    /// Expiry wake-up for `key`.
    ///
    /// Removes the key only if its recorded deadline is still the one this
    /// task was scheduled for. A write or delete that raced with the
    /// wake-up leaves a different (or no) deadline, and the stale task must
    /// not touch the newer state.
    fn reap(&self, key: &str, deadline: Instant) {
        let mut state = self.state.lock();
        if state.deadlines.get(key) != Some(&deadline) {
            tracing::trace!("stale expiry wake-up for {key}, ignoring");
            return;
        }
        state.entries.remove(key);
        state.deadlines.remove(key);
        state.reapers.remove(key);
        tracing::debug!("expired key {key}");
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The identity this key space belongs to
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The snapshot file this space saves to and loads from
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Number of keys currently holding a value
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the key space holds no values
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Whether an expiry is currently scheduled for `key`
    pub fn has_pending_expiry(&self, key: &str) -> bool {
        self.state.lock().deadlines.contains_key(key)
    }
}

impl SpaceState {
    /// Abort the pending expiry task for `key`, if one exists
    fn cancel_reaper(&mut self, key: &str) {
        if let Some(handle) = self.reapers.remove(key) {
            handle.abort();
        }
    }

    /// The mutable list under `key`, created empty if the key is absent
    fn list_entry(&mut self, key: &str) -> Result<&mut Vec<String>, WrongType> {
        match self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Stored::List(Vec::new()))
        {
            Stored::List(list) => Ok(list),
            Stored::Text(_) => Err(WrongType),
        }
    }
}
