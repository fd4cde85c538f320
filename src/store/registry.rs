//! Identity Registry
//!
//! Process-wide map from peer identity to key space. Built once at startup
//! and handed to the connection layer by reference, deliberately not a
//! module-level singleton. Entries are added on first acquire and never
//! removed: an engine lives for the process lifetime, which is what makes
//! identity-keyed state survive reconnects.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::KeySpace;
use crate::error::Result;

// =============================================================================
// Registry
// =============================================================================

/// Process-wide collection of key spaces, one per identity
pub struct Registry {
    /// Snapshot directory shared by every key space
    data_dir: PathBuf,
    /// Engine per identity, write-locked only while creating a new entry.
    spaces: RwLock<HashMap<String, Arc<KeySpace>>>,
}

impl Registry {
    /// Create a registry rooted at `data_dir`, creating the directory if it
    /// does not exist yet
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Registry> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Registry {
            data_dir,
            spaces: RwLock::new(HashMap::new()),
        })
    }

    /// The key space for `identity`, created on first call.
    ///
    /// The first acquire loads the identity's snapshot if one exists; every
    /// later call, from any connection, returns the same instance.
    pub fn acquire(&self, identity: &str) -> Arc<KeySpace> {
        if let Some(space) = self.spaces.read().get(identity) {
            return Arc::clone(space);
        }

        // Two connections can race past the read miss; the entry API keeps
        // whichever engine lands first.
        let mut spaces = self.spaces.write();
        let space = spaces.entry(identity.to_string()).or_insert_with(|| {
            tracing::debug!("opening key space for {identity}");
            Arc::new(KeySpace::open(identity, &self.data_dir))
        });
        Arc::clone(space)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The directory snapshots are written to
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Number of key spaces created so far
    pub fn space_count(&self) -> usize {
        self.spaces.read().len()
    }
}
