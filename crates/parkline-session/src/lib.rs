//! Session management for the Parkline client.
//!
//! This crate owns the authenticated identity and its lifecycle:
//!
//! 1. **Identity tracking** — knowing who is signed in ([`SessionManager`])
//! 2. **Persistence** — surviving restarts ([`SessionStore`] trait, with a
//!    JSON file store and an in-memory store for tests)
//! 3. **Revalidation** — confirming a restored credential is still honored
//!    by the server ([`IdentityProbe`] trait)
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)       <- drives login/logout, reacts to session changes
//!     |
//! Session Layer (this crate)  <- single source of truth for identity
//!     |
//! Gateway (beside)     <- reads the credential through [`CredentialCell`]
//! ```
//!
//! The gateway never talks to the manager directly. It holds a clone of
//! the [`CredentialCell`], a small shared slot the manager arms on login
//! and disarms on logout. That keeps the dependency arrow pointing one
//! way: gateway -> session, never back.

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod probe;
mod session;
mod store;

pub use error::SessionError;
pub use manager::SessionManager;
pub use probe::IdentityProbe;
pub use session::{CredentialCell, Identity, SessionView};
pub use store::{JsonFileStore, MemoryStore, SessionStore};
