//! Snapshot Persistence
//!
//! One JSON file per identity: a single object whose keys are the stored
//! keys and whose values are either a string (Text) or an array of strings
//! (List). Expiry metadata never reaches the file, so a restored key space
//! starts with every key permanent.
//!
//! ```text
//! {"greeting":"hello","jobs":["first","second"]}
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::Stored;
use crate::error::Result;

/// Write the full mapping to `path`, replacing any previous snapshot
pub fn save(path: &Path, entries: &HashMap<String, Stored>) -> Result<()> {
    let json = serde_json::to_vec(entries)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a snapshot back, if one exists.
///
/// Absence is the ordinary first-run case. An unreadable or malformed file
/// is logged and likewise treated as no snapshot: a key space must always
/// open, with an empty mapping if need be.
pub fn load(path: &Path) -> Option<HashMap<String, Stored>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!("unreadable snapshot {}: {}", path.display(), err);
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => Some(entries),
        Err(err) => {
            tracing::warn!("malformed snapshot {}: {}", path.display(), err);
            None
        }
    }
}
