//! # Parkline
//!
//! Headless client engine for the Parkline parking reservation service.
//!
//! The engine owns everything between the rendering layer and the HTTP
//! wire: the authenticated session and its persistence, route guarding,
//! the reservation lifecycle and its local cache, user-facing alerts,
//! and the administration surface. A UI embeds a [`ParklineClient`],
//! renders from its handles, and calls its operations; it never builds
//! a request or inspects a status code.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use parkline::prelude::*;
//!
//! # async fn run() -> Result<(), parkline::ParklineError> {
//! let client = ParklineClient::builder()
//!     .base_url("https://parkline.example.com/api")
//!     .build();
//!
//! // Confirm a session restored from disk, then route.
//! client.revalidate().await;
//! let landing = client.navigate("/dashboard");
//!
//! let role = client.login("alice", "secret", Role::User).await?;
//! let home = client.navigate(parkline::role_home(Some(role)));
//! # Ok(())
//! # }
//! ```

mod admin;
mod client;
mod error;
mod notify;

pub use admin::Admin;
pub use client::{ParklineClient, ParklineClientBuilder};
pub use error::ParklineError;
pub use notify::{Alert, Notifier};

// The vocabulary types callers handle directly.
pub use parkline_api::{
    ApiError, ChangePasswordRequest, DashboardResponse, LotRequest,
    ParkingLot, ParkingSpot, ProfileUpdate, RegisterRequest, Reservation,
    ReservationPage, ReservationRequest, ReservationStatus, Role, Severity,
    User, UsersPage,
};
pub use parkline_guard::{ADMIN_HOME, LOGIN_PATH, USER_HOME, role_home};
pub use parkline_session::{
    JsonFileStore, MemoryStore, SessionStore, SessionView,
};

/// The common imports for embedding the engine.
pub mod prelude {
    pub use crate::{
        Alert, ParklineClient, ParklineError, RegisterRequest,
        ReservationRequest, ReservationStatus, Role, Severity, SessionView,
    };
}

/// Installs the standard log subscriber: compact output, filtered by
/// `RUST_LOG`. Call once at startup; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
