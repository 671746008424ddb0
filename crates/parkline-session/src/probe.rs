//! Identity probe: the hook for confirming a restored session.
//!
//! This crate does not know how to reach the server. Instead it defines
//! the [`IdentityProbe`] trait: a single async method that asks "is the
//! currently armed credential still honored, and who does it belong to?"
//! The gateway implements it with a real HTTP call; tests implement it
//! with a canned answer.
//!
//! # Why a trait?
//!
//! Revalidation is the only moment the session layer needs the network.
//! Pulling that one call behind a trait keeps this crate free of HTTP
//! concerns and lets the manager's fail-closed logic be tested without
//! a server.

use parkline_api::{ApiError, User};

/// Confirms the armed credential against the server.
///
/// # Trait bounds
///
/// - `Send + Sync` — the probe is shared across async tasks.
/// - `'static` — it does not borrow temporary data; it lives as long
///   as the client.
pub trait IdentityProbe: Send + Sync + 'static {
    /// Asks the server who the armed credential belongs to.
    ///
    /// # Returns
    /// - `Ok(User)` — the credential is still honored; here is the
    ///   fresh profile.
    /// - `Err(ApiError::Unauthorized)` — the credential was rejected.
    /// - `Err(_)` — the check could not be completed (network, 5xx).
    fn check_identity(
        &self,
    ) -> impl std::future::Future<Output = Result<User, ApiError>> + Send;
}
