//! Reservation state and lifecycle operations for the Parkline client.
//!
//! Two pieces live here:
//!
//! 1. **[`ReservationBook`]** — the local cache of reservation state:
//!    the current (non-terminal) reservation, the history page, and the
//!    lot inventory. Pure data, no I/O, every mutation checked against
//!    the cache's own invariants.
//! 2. **[`ReservationController`]** — the operations: reserve, park,
//!    release, and the fetches. Each one calls the server through the
//!    gateway, applies the authoritative record it gets back to the
//!    book, and reports the outcome through an [`AlertSink`].
//!
//! The split keeps the state machine testable without a server: the
//! book's rules are exercised directly, the controller's wiring is
//! exercised against a stub.
//!
//! # The server is the source of truth
//!
//! The client never computes costs, durations, or spot assignments. An
//! operation sends the user's intent; whatever record comes back
//! replaces the cached one wholesale. A failed operation changes
//! nothing locally.

mod book;
mod controller;

pub use book::ReservationBook;
pub use controller::ReservationController;

use parkline_api::Severity;

/// Receives user-facing outcome messages from the controller.
///
/// Implemented by the facade's notifier. A trait rather than a direct
/// dependency so the controller can be tested with a recording sink.
pub trait AlertSink: Send + Sync {
    /// Reports an outcome. `severity` picks the presentation; the
    /// message is already final wording.
    fn alert(&self, message: &str, severity: Severity);
}
