//! Authenticated HTTP gateway for the Parkline client.
//!
//! Every request the client makes goes through one [`Gateway`]. The
//! gateway is responsible for the things that must happen uniformly:
//!
//! 1. **Credential injection** — attaching the bearer credential when
//!    one is armed (read from the session layer's `CredentialCell`)
//! 2. **Error classification** — turning transport failures and HTTP
//!    statuses into the [`ApiError`] taxonomy
//! 3. **The unauthorized reaction** — telling a [`SessionObserver`]
//!    exactly once per rejected request that the session is dead, and
//!    whether the user needs to be moved to the login surface
//!
//! # How it fits in the stack
//!
//! ```text
//! Reservations / Facade (above)  <- call typed verbs, get typed records
//!     |
//! Gateway (this crate)           <- one choke point for HTTP concerns
//!     |
//! Session Layer (beside)         <- supplies the credential, absorbs 401s
//! ```
//!
//! Callers never see HTTP statuses or raw bodies. They pass a path and
//! a request record, and get back a response record or an [`ApiError`].

mod http;

pub use http::Gateway;

use std::time::Duration;

/// Reacts to the gateway's discovery that the credential is dead.
///
/// Implemented by the facade, which clears the session and moves the
/// user to the login surface. A trait rather than a direct call keeps
/// the dependency arrow pointing gateway -> session, not gateway ->
/// facade.
pub trait SessionObserver: Send + Sync {
    /// The server rejected the credential. Called once per rejected
    /// request, whatever surface the user is on.
    fn session_invalidated(&self);

    /// The user must be moved to the login surface. Not called when
    /// they are already there; re-landing on the login page would
    /// discard whatever they have typed into it.
    fn login_required(&self);
}

/// Connection settings for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Root of the remote API. Paths are appended verbatim, so the
    /// value carries no trailing slash.
    pub base_url: String,

    /// The client-side path of the login surface. Used to suppress the
    /// redirect part of the unauthorized reaction.
    pub login_path: String,

    /// Per-request deadline covering connect, send, and body read.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001/api".to_string(),
            login_path: "/login".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}
