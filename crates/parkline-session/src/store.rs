//! Durable session storage.
//!
//! The manager treats storage as a seam: anything that can load, save,
//! and remove one [`Identity`] record. Two implementations live here:
//!
//! - [`JsonFileStore`] — one JSON file in the platform data directory.
//!   This is what real clients use; it is what makes "still signed in
//!   after a restart" work.
//! - [`MemoryStore`] — a mutex around an `Option`. Used by tests and by
//!   callers that explicitly want a session that dies with the process.
//!
//! Storage is synchronous on purpose. The record is a few hundred bytes
//! and is touched once at startup and once per login/logout; an async
//! file API would buy nothing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::{Identity, SessionError};

/// Persists the signed-in identity across process restarts.
pub trait SessionStore: Send + Sync {
    /// Loads the persisted identity, if one exists.
    ///
    /// A missing record is `Ok(None)`, not an error. Only a failure to
    /// read the backing medium is an error.
    fn load(&self) -> Result<Option<Identity>, SessionError>;

    /// Persists the identity, replacing any previous record.
    fn save(&self, identity: &Identity) -> Result<(), SessionError>;

    /// Removes the persisted record. Removing a record that does not
    /// exist is fine.
    fn remove(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// Stores the identity as a JSON file on disk.
///
/// Writes go through a temporary file in the same directory followed by
/// a rename, so a crash mid-write leaves either the old record or the
/// new one, never a truncated file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the conventional per-user location, e.g.
    /// `~/.local/share/parkline/session.json` on Linux.
    ///
    /// Falls back to the current directory when the platform has no
    /// data directory (some containers).
    pub fn open_default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("parkline").join("session.json"))
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for JsonFileStore {
    fn load(&self) -> Result<Option<Identity>, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        // A record we cannot parse is treated as no record at all. The
        // user signs in again and the next save overwrites the damage.
        match serde_json::from_str(&raw) {
            Ok(identity) => Ok(Some(identity)),
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "discarding unreadable session record"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, identity: &Identity) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string_pretty(identity)?;

        // Temp file + rename keeps the record whole under a crash.
        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(raw.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Identity>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Identity>, SessionError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, identity: &Identity) -> Result<(), SessionError> {
        *self.slot.lock() = Some(identity.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), SessionError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
