//! Wire data model for the Parkline client.
//!
//! Every record in this crate mirrors the authoritative server's JSON
//! exactly. The client is a consistent cache over the server, never the
//! source of truth, so these types carry no business logic beyond small
//! status predicates.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session / Guard / Reservations (above)  <- consume these records
//!     |
//! API Layer (this crate)                  <- wire shapes + error taxonomy
//!     |
//! Gateway (beside)                        <- moves them over HTTP
//! ```

mod error;
mod types;

pub use error::{ApiError, ErrorBody};
pub use types::{
    AuthResponse, ChangePasswordRequest, DashboardResponse,
    DashboardStatistics, LoginRequest, LotRequest, LotResponse,
    MeResponse, MessageResponse, ParkingLot, ParkingLotsResponse,
    ParkingSpot, ProfileResponse, ProfileUpdate, RegisterRequest,
    Reservation, ReservationPage, ReservationRequest, ReservationResponse,
    ReservationStatus, Role, Severity, User, UsersPage,
};
