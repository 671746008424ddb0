//! The session manager: the single source of truth for who is signed in.
//!
//! Responsible for:
//! - Establishing an identity after a successful login
//! - Clearing it on logout or credential rejection
//! - Keeping the durable store and the gateway's credential cell in
//!   lockstep with memory
//! - Revalidating a restored identity at startup
//! - Telling subscribers whenever the session changes
//!
//! # Concurrency note
//!
//! The manager is shared (`Arc<SessionManager>`) between the facade and
//! the gateway's unauthorized hook, so its state lives behind locks. The
//! identity lock is held only for reads and swaps, never across a store
//! write or a subscriber call, which keeps re-entrant notification
//! (subscriber triggers another session call) from deadlocking.

use parking_lot::{Mutex, RwLock};
use parkline_api::{Role, User};

use crate::{
    CredentialCell, Identity, IdentityProbe, SessionError, SessionStore,
    SessionView,
};

type Subscriber = Box<dyn Fn(&SessionView) + Send + Sync>;

/// Owns the authenticated identity and its persistence.
///
/// ## Lifecycle
///
/// ```text
/// open() -- restores from store, arms the credential cell
///    |
/// revalidate() -- probe confirms or rejects the restored credential
///    |
/// establish() <--- login            clear() <--- logout / 401
///    |                                 |
/// [signed in] --- update_user() --- [signed out]
/// ```
///
/// Every transition writes the store first, then memory, then the
/// credential cell, then notifies. A failed store write on establish
/// aborts the transition, so a session the user believes is durable
/// never exists only in memory.
pub struct SessionManager {
    /// The current identity. One `Option` for all three fields keeps
    /// the session all-or-nothing.
    identity: RwLock<Option<Identity>>,

    /// Durable storage behind the trait seam.
    store: Box<dyn SessionStore>,

    /// The slot the gateway reads its bearer credential from.
    cell: CredentialCell,

    /// Change listeners. Separate lock so notifying never holds the
    /// identity lock.
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SessionManager {
    /// Opens the manager, restoring any persisted identity.
    ///
    /// A restored identity arms the credential cell immediately so that
    /// the very first request after startup is authenticated. Whether
    /// the credential is still honored is decided later by
    /// [`revalidate`](Self::revalidate).
    ///
    /// A store that fails to load is logged and treated as empty; a
    /// client that cannot read its session file starts signed out, it
    /// does not crash.
    pub fn open(store: Box<dyn SessionStore>, cell: CredentialCell) -> Self {
        let restored = match store.load() {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(error = %err, "session restore failed, starting signed out");
                None
            }
        };

        if let Some(identity) = &restored {
            cell.set(identity.credential.clone());
            tracing::info!(
                username = %identity.user.username,
                role = %identity.role,
                "restored persisted session"
            );
        }

        Self {
            identity: RwLock::new(restored),
            store,
            cell,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Establishes a new identity after a successful login.
    ///
    /// The store write happens before memory is touched. If persistence
    /// fails the session state is unchanged and the error propagates to
    /// the caller, who surfaces it as a failed login.
    pub fn establish(&self, identity: Identity) -> Result<(), SessionError> {
        self.store.save(&identity)?;

        self.cell.set(identity.credential.clone());
        tracing::info!(
            username = %identity.user.username,
            role = %identity.role,
            "session established"
        );
        *self.identity.write() = Some(identity);

        self.notify();
        Ok(())
    }

    /// Clears the identity. Idempotent.
    ///
    /// Used for both deliberate logout and credential rejection, so it
    /// must never fail: a store that cannot remove its record is logged
    /// and the in-memory clear proceeds regardless. Clearing an already
    /// empty session notifies nobody.
    pub fn clear(&self) {
        let had_identity = self.identity.write().take().is_some();
        self.cell.clear();

        if let Err(err) = self.store.remove() {
            tracing::warn!(error = %err, "failed to remove persisted session");
        }

        if had_identity {
            tracing::info!("session cleared");
            self.notify();
        }
    }

    /// Replaces the cached profile after the server confirmed a change
    /// (profile update, revalidation). No-op when signed out; a profile
    /// without a session would violate the all-or-nothing rule.
    pub fn update_user(&self, user: User) {
        let updated = {
            let mut guard = self.identity.write();
            match guard.as_mut() {
                Some(identity) => {
                    identity.user = user;
                    Some(identity.clone())
                }
                None => None,
            }
        };

        if let Some(identity) = updated {
            if let Err(err) = self.store.save(&identity) {
                tracing::warn!(error = %err, "failed to persist updated profile");
            }
            self.notify();
        }
    }

    /// Confirms a restored credential against the server.
    ///
    /// Fail-closed: any answer other than "yes, and here is the fresh
    /// profile" clears the session. A network outage at startup signs
    /// the user out rather than letting a possibly-revoked credential
    /// keep acting.
    ///
    /// No-op when signed out.
    pub async fn revalidate<P: IdentityProbe>(&self, probe: &P) {
        if self.identity.read().is_none() {
            return;
        }

        match probe.check_identity().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "restored session confirmed");
                self.update_user(user);
            }
            Err(err) => {
                tracing::info!(error = %err, "restored session rejected, signing out");
                self.clear();
            }
        }
    }

    /// A routing-grade snapshot of the current session.
    pub fn view(&self) -> SessionView {
        match self.identity.read().as_ref() {
            Some(identity) => SessionView {
                authenticated: true,
                role: Some(identity.role),
            },
            None => SessionView::anonymous(),
        }
    }

    /// `true` while an identity is established.
    pub fn is_authenticated(&self) -> bool {
        self.identity.read().is_some()
    }

    /// A copy of the signed-in profile, or `None` when signed out.
    pub fn user(&self) -> Option<User> {
        self.identity.read().as_ref().map(|i| i.user.clone())
    }

    /// A copy of the armed credential, or `None` when signed out.
    pub fn credential(&self) -> Option<String> {
        self.identity.read().as_ref().map(|i| i.credential.clone())
    }

    /// The signed-in role, or `None` when signed out.
    pub fn role(&self) -> Option<Role> {
        self.identity.read().as_ref().map(|i| i.role)
    }

    /// Registers a listener called after every session change with the
    /// new snapshot. Listeners live as long as the manager.
    pub fn subscribe(&self, listener: impl Fn(&SessionView) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(listener));
    }

    fn notify(&self) {
        let view = self.view();
        for listener in self.subscribers.lock().iter() {
            listener(&view);
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! The durable store is always [`MemoryStore`] except where a real
    //! file is the point of the test; the probe is a canned stub. No
    //! network, no shared state between tests.

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parkline_api::ApiError;

    use super::*;
    use crate::{JsonFileStore, MemoryStore};

    // -- Helpers ----------------------------------------------------------

    fn user(username: &str) -> User {
        User {
            id: 1,
            username: username.into(),
            email: format!("{username}@example.com"),
            phone_number: None,
            first_name: "Test".into(),
            last_name: "User".into(),
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn identity(credential: &str, role: Role) -> Identity {
        Identity {
            credential: credential.into(),
            user: user("alice"),
            role,
        }
    }

    fn fresh_manager() -> (SessionManager, CredentialCell) {
        let cell = CredentialCell::new();
        let mgr = SessionManager::open(Box::new(MemoryStore::new()), cell.clone());
        (mgr, cell)
    }

    /// A probe with a canned answer.
    struct StubProbe {
        answer: Result<User, ApiError>,
    }

    impl IdentityProbe for StubProbe {
        async fn check_identity(&self) -> Result<User, ApiError> {
            self.answer.clone()
        }
    }

    // =====================================================================
    // open()
    // =====================================================================

    #[test]
    fn test_open_empty_store_starts_signed_out() {
        let (mgr, cell) = fresh_manager();

        assert_eq!(mgr.view(), SessionView::anonymous());
        assert!(!cell.is_armed());
    }

    #[test]
    fn test_open_restores_persisted_identity_and_arms_cell() {
        let store = MemoryStore::new();
        store.save(&identity("tok-1", Role::Admin)).unwrap();
        let cell = CredentialCell::new();

        let mgr = SessionManager::open(Box::new(store), cell.clone());

        assert!(mgr.view().authenticated);
        assert_eq!(mgr.role(), Some(Role::Admin));
        assert_eq!(cell.get().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_open_survives_restart_via_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        // First "process": sign in, then drop everything.
        {
            let mgr = SessionManager::open(
                Box::new(JsonFileStore::new(&path)),
                CredentialCell::new(),
            );
            mgr.establish(identity("tok-1", Role::User)).unwrap();
        }

        // Second "process": the identity comes back from disk.
        let cell = CredentialCell::new();
        let mgr =
            SessionManager::open(Box::new(JsonFileStore::new(&path)), cell.clone());

        assert_eq!(mgr.user().map(|u| u.username), Some("alice".to_string()));
        assert_eq!(cell.get().as_deref(), Some("tok-1"));
    }

    // =====================================================================
    // establish() / clear()
    // =====================================================================

    #[test]
    fn test_establish_populates_all_three_or_nothing() {
        let (mgr, cell) = fresh_manager();

        mgr.establish(identity("tok-1", Role::User)).unwrap();

        // Credential, profile, and role appear together.
        assert!(mgr.is_authenticated());
        assert!(cell.is_armed());
        assert_eq!(mgr.credential().as_deref(), Some("tok-1"));
        assert!(mgr.user().is_some());
        assert_eq!(mgr.role(), Some(Role::User));
    }

    #[test]
    fn test_clear_empties_all_three_and_is_idempotent() {
        let (mgr, cell) = fresh_manager();
        mgr.establish(identity("tok-1", Role::User)).unwrap();

        mgr.clear();
        mgr.clear();

        assert!(!mgr.is_authenticated());
        assert!(!cell.is_armed());
        assert!(mgr.credential().is_none());
        assert!(mgr.user().is_none());
        assert_eq!(mgr.view(), SessionView::anonymous());
    }

    #[test]
    fn test_clear_notifies_only_when_something_was_cleared() {
        let (mgr, _cell) = fresh_manager();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        mgr.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        mgr.clear(); // already signed out, no change
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        mgr.establish(identity("tok-1", Role::User)).unwrap();
        mgr.clear();
        mgr.clear(); // second clear is a no-op

        // establish + first clear = 2 notifications.
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    // =====================================================================
    // update_user()
    // =====================================================================

    #[test]
    fn test_update_user_replaces_profile_in_place() {
        let (mgr, _cell) = fresh_manager();
        mgr.establish(identity("tok-1", Role::User)).unwrap();

        let mut renamed = user("alice");
        renamed.first_name = "Alicia".into();
        mgr.update_user(renamed);

        assert_eq!(
            mgr.user().map(|u| u.first_name),
            Some("Alicia".to_string())
        );
        // Role and credential are untouched.
        assert_eq!(mgr.role(), Some(Role::User));
    }

    #[test]
    fn test_update_user_when_signed_out_does_nothing() {
        let (mgr, _cell) = fresh_manager();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        mgr.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        mgr.update_user(user("ghost"));

        assert!(mgr.user().is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    // =====================================================================
    // revalidate()
    // =====================================================================

    #[tokio::test]
    async fn test_revalidate_confirmed_keeps_session_and_refreshes_profile() {
        let (mgr, cell) = fresh_manager();
        mgr.establish(identity("tok-1", Role::User)).unwrap();

        let mut fresh = user("alice");
        fresh.email = "new@example.com".into();
        let probe = StubProbe { answer: Ok(fresh) };

        mgr.revalidate(&probe).await;

        assert!(cell.is_armed());
        assert_eq!(
            mgr.user().map(|u| u.email),
            Some("new@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_revalidate_rejected_clears_session() {
        let (mgr, cell) = fresh_manager();
        mgr.establish(identity("tok-1", Role::User)).unwrap();

        let probe = StubProbe {
            answer: Err(ApiError::Unauthorized),
        };
        mgr.revalidate(&probe).await;

        assert!(!cell.is_armed());
        assert_eq!(mgr.view(), SessionView::anonymous());
    }

    #[tokio::test]
    async fn test_revalidate_unreachable_server_fails_closed() {
        let (mgr, cell) = fresh_manager();
        mgr.establish(identity("tok-1", Role::User)).unwrap();

        // Could not verify either way. Signing out is the safe answer.
        let probe = StubProbe {
            answer: Err(ApiError::Network {
                message: "connection refused".into(),
            }),
        };
        mgr.revalidate(&probe).await;

        assert!(!cell.is_armed());
        assert!(mgr.user().is_none());
    }

    #[tokio::test]
    async fn test_revalidate_when_signed_out_is_a_no_op() {
        let (mgr, _cell) = fresh_manager();

        // The probe must not even be consulted; a canned success would
        // otherwise conjure a session out of nothing.
        let probe = StubProbe {
            answer: Ok(user("ghost")),
        };
        mgr.revalidate(&probe).await;

        assert_eq!(mgr.view(), SessionView::anonymous());
    }

    // =====================================================================
    // subscribe()
    // =====================================================================

    #[test]
    fn test_subscribe_sees_each_transition_snapshot() {
        let (mgr, _cell) = fresh_manager();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        mgr.subscribe(move |view| sink.lock().push(*view));

        mgr.establish(identity("tok-1", Role::Admin)).unwrap();
        mgr.clear();

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            SessionView {
                authenticated: true,
                role: Some(Role::Admin)
            }
        );
        assert_eq!(seen[1], SessionView::anonymous());
    }
}
