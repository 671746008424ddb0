//! Records exchanged with the parking service.
//!
//! Field names and casing match the server's JSON byte for byte. The
//! server serializes timestamps as naive ISO-8601 strings (no timezone
//! suffix), which is why the date fields are `NaiveDateTime` and not
//! `DateTime<Utc>`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The role attached to an authenticated session.
///
/// Serialized lowercase (`"user"` / `"admin"`) to match the server's
/// `user_type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular account: browses lots, reserves and releases spots.
    User,
    /// An administrator: manages lots, users, and reservations.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// A user record as the server returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Parking inventory
// ---------------------------------------------------------------------------

/// A parking lot, including the server-computed availability counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: u64,
    pub prime_location_name: String,
    pub address: String,
    pub pin_code: String,
    pub number_of_spots: u32,
    pub price_per_hour: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Spots currently free. Computed server-side; never derived locally.
    #[serde(default)]
    pub available_spots: u32,
    /// Spots currently occupied. Computed server-side.
    #[serde(default)]
    pub occupied_spots: u32,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// A single spot inside a lot. Spot status is the server's single-letter
/// code: `"A"` available, `"O"` occupied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub id: u64,
    pub lot_id: u64,
    pub spot_number: String,
    pub status: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// The lifecycle state of a reservation.
///
/// ```text
/// reserved --(park)--> active --(release)--> completed
///     |
///     +--(release)--> cancelled
/// ```
///
/// `completed` and `cancelled` are terminal: a reservation in either state
/// never transitions again. The server enforces the transitions; the client
/// only mirrors whatever status the server returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Reserved,
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// Returns `true` if no further transition can occur from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => write!(f, "reserved"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A reservation exactly as the server serializes it.
///
/// Cost and timestamps are server-computed. The client never fills these
/// in locally: after a park or release call, the whole record is replaced
/// with the one from the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: u64,
    pub user_id: u64,
    pub spot_id: u64,
    #[serde(default)]
    pub parking_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub leaving_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub reservation_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub parking_cost: Option<f64>,
    pub status: ReservationStatus,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
    /// Denormalized display fields the server joins in.
    #[serde(default)]
    pub parking_lot_name: Option<String>,
    #[serde(default)]
    pub spot_number: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

// ---------------------------------------------------------------------------
// Alert severity
// ---------------------------------------------------------------------------

/// Severity of a user-facing alert.
///
/// Part of the shared vocabulary between the business layers (which raise
/// alerts) and the notification coordinator (which displays them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Danger,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub user_type: Role,
}

/// Body of `POST /auth/register`. Registration always creates a `user`
/// role account; admins are provisioned server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Body of `PUT /user/profile`. Only the fields the server allows a user
/// to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Body of `POST /auth/change-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Body of `POST /user/reservations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub lot_id: u64,
    pub vehicle_number: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Body of `POST /admin/parking-lots` and `PUT /admin/parking-lots/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotRequest {
    pub prime_location_name: String,
    pub address: String,
    pub pin_code: String,
    pub number_of_spots: u32,
    pub price_per_hour: f64,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response of `POST /auth/login` and `POST /auth/register`: both
/// issue a credential, so registering signs the new account in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
    pub user_type: Role,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: User,
    #[serde(default)]
    pub user_type: Option<Role>,
}

/// Response of `PUT /user/profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope around a single reservation, returned by the reserve, park,
/// and release endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub reservation: Reservation,
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of reservation history. Pagination is page-based, 1-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationPage {
    pub reservations: Vec<Reservation>,
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
    pub per_page: u32,
}

/// Response of `GET /user/parking-lots` and `GET /admin/parking-lots`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLotsResponse {
    pub parking_lots: Vec<ParkingLot>,
}

/// Envelope around a single lot, returned by the admin lot endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotResponse {
    pub parking_lot: ParkingLot,
    #[serde(default)]
    pub message: Option<String>,
}

/// Aggregate statistics on the user dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStatistics {
    pub total_reservations: u64,
    pub total_spent: f64,
}

/// Response of `GET /user/dashboard`: the current reservation (if any),
/// the most recent history, and aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(default)]
    pub active_reservation: Option<Reservation>,
    #[serde(default)]
    pub recent_reservations: Vec<Reservation>,
    #[serde(default)]
    pub statistics: Option<DashboardStatistics>,
}

/// One page of user accounts from `GET /admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
}

/// Generic `{ "message": ... }` acknowledgement body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// =========================================================================
// Tests
// =========================================================================
