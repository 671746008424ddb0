//! Session types: the identity record and the shared credential slot.
//!
//! An "identity" is the client's record of a signed-in user. It tracks:
//! - WHAT proves them (the bearer credential)
//! - WHO they are (the profile record)
//! - WHICH surface they belong to (their role)
//!
//! The three always travel together. There is no state where a credential
//! exists without a profile, or a profile without a role.

use std::sync::Arc;

use parking_lot::RwLock;
use parkline_api::{Role, User};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The complete record of a signed-in user.
///
/// This is what gets persisted to disk and what the manager holds in
/// memory. Wrapping all three fields in one struct (held behind a single
/// `Option`) is what enforces the all-or-nothing rule: the session is
/// either fully populated or fully empty, never half of each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// The opaque bearer credential issued at login. The client never
    /// inspects it, only replays it on requests.
    pub credential: String,

    /// The signed-in user's profile as the server last reported it.
    pub user: User,

    /// The role the user authenticated under. Decides which surfaces
    /// the guard lets them reach.
    pub role: Role,
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// A cheap snapshot of session state for callers that only route.
///
/// The guard needs "is someone signed in, and as what role" and nothing
/// else. Handing it this small copy instead of the full [`Identity`]
/// keeps the credential out of code that has no business seeing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView {
    /// Whether an identity is currently established.
    pub authenticated: bool,

    /// The role of the signed-in user, or `None` when signed out.
    pub role: Option<Role>,
}

impl SessionView {
    /// The signed-out snapshot.
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            role: None,
        }
    }
}

// ---------------------------------------------------------------------------
// CredentialCell
// ---------------------------------------------------------------------------

/// A shared slot holding the current bearer credential, if any.
///
/// The manager owns one of these and arms/disarms it as the session
/// changes. The gateway holds a clone and reads it on every outbound
/// request. Cloning is cheap (`Arc` bump) and both ends always observe
/// the same value.
///
/// The lock is held only for the duration of a read or swap, never
/// across a request, so contention is negligible.
#[derive(Debug, Clone, Default)]
pub struct CredentialCell {
    inner: Arc<RwLock<Option<String>>>,
}

impl CredentialCell {
    /// Creates an empty (disarmed) cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current credential, or `None` when disarmed.
    pub fn get(&self) -> Option<String> {
        self.inner.read().clone()
    }

    /// Arms the cell with a credential. Replaces any previous value.
    pub fn set(&self, credential: String) {
        *self.inner.write() = Some(credential);
    }

    /// Disarms the cell. Subsequent requests go out unauthenticated.
    pub fn clear(&self) {
        *self.inner.write() = None;
    }

    /// Returns `true` if a credential is currently armed.
    pub fn is_armed(&self) -> bool {
        self.inner.read().is_some()
    }
}
