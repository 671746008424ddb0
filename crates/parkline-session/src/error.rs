//! Error types for the session layer.

/// Errors that can occur while persisting or restoring a session.
///
/// In-memory session changes never fail. Only the durable store can,
/// and those failures are deliberately narrow: the filesystem said no,
/// or the file on disk was not a session record.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The store could not read or write its backing file.
    #[error("session storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// The backing file existed but did not contain a valid session
    /// record. Treated as "no session" by the manager, never fatal.
    #[error("session record corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
