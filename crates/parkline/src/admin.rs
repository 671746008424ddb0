//! The administration surface: lot inventory, accounts, analytics.
//!
//! Everything here requires an admin session; under any other session
//! the server answers 403, which surfaces as an alert and leaves the
//! session intact. The client adds no admin-side caching: admin views
//! are lists the server pages, fetched when shown.

use std::sync::Arc;

use parkline_api::{
    ApiError, LotRequest, LotResponse, MessageResponse, ParkingLot,
    ParkingLotsResponse, ParkingSpot, ReservationPage, Severity, UsersPage,
};
use parkline_gateway::Gateway;
use serde::Deserialize;
use serde_json::Value;

use crate::notify::Notifier;
use crate::ParklineError;

/// Response of `GET /admin/parking-lots/{id}/spots`.
#[derive(Debug, Deserialize)]
struct SpotsResponse {
    spots: Vec<ParkingSpot>,
}

/// Handle for admin operations. Cheap to create, holds no state of its
/// own.
pub struct Admin {
    gateway: Arc<Gateway>,
    notifier: Notifier,
}

impl Admin {
    pub(crate) fn new(gateway: Arc<Gateway>, notifier: Notifier) -> Self {
        Self { gateway, notifier }
    }

    // --- Dashboard and analytics -----------------------------------------------

    /// The admin home: fleet-wide counts, lot summaries, and recent
    /// reservations. The payload is display-shaped and changes with the
    /// server's reporting; it is passed through undecoded.
    pub async fn dashboard(&self) -> Result<Value, ParklineError> {
        let result: Result<Value, ApiError> = self.gateway.get("/admin/dashboard").await;
        result.map_err(|err| self.failure(err, "Failed to fetch dashboard data"))
    }

    /// The analytics aggregates, same pass-through shape as
    /// [`dashboard`](Self::dashboard).
    pub async fn overview(&self) -> Result<Value, ParklineError> {
        let result: Result<Value, ApiError> =
            self.gateway.get("/analytics/dashboard").await;
        result.map_err(|err| self.failure(err, "Failed to fetch analytics"))
    }

    /// Per-lot occupancy and revenue series.
    pub async fn lot_analytics(&self, lot_id: u64) -> Result<Value, ParklineError> {
        let path = format!("/analytics/lots/{lot_id}/analytics");
        let result: Result<Value, ApiError> = self.gateway.get(&path).await;
        result.map_err(|err| self.failure(err, "Failed to fetch lot analytics"))
    }

    // --- Lot inventory ---------------------------------------------------------

    /// Every lot, active or not. The user-facing listing filters to
    /// active lots server-side; the admin sees all of them.
    pub async fn lots(&self) -> Result<Vec<ParkingLot>, ParklineError> {
        let result: Result<ParkingLotsResponse, ApiError> =
            self.gateway.get("/admin/parking-lots").await;
        match result {
            Ok(response) => Ok(response.parking_lots),
            Err(err) => Err(self.failure(err, "Failed to fetch parking lots")),
        }
    }

    /// Creates a lot. The server materializes its spots.
    pub async fn create_lot(&self, request: &LotRequest) -> Result<ParkingLot, ParklineError> {
        let result: Result<LotResponse, ApiError> =
            self.gateway.post("/admin/parking-lots", request).await;
        self.lot_outcome(result, "Parking lot created successfully!", "Failed to create parking lot")
    }

    /// Updates a lot. Shrinking below the occupied count is refused by
    /// the server; the refusal message is surfaced verbatim.
    pub async fn update_lot(
        &self,
        lot_id: u64,
        request: &LotRequest,
    ) -> Result<ParkingLot, ParklineError> {
        let path = format!("/admin/parking-lots/{lot_id}");
        let result: Result<LotResponse, ApiError> = self.gateway.put(&path, request).await;
        self.lot_outcome(result, "Parking lot updated successfully!", "Failed to update parking lot")
    }

    /// Deletes a lot. Refused by the server while any spot is occupied.
    pub async fn delete_lot(&self, lot_id: u64) -> Result<(), ParklineError> {
        let path = format!("/admin/parking-lots/{lot_id}");
        let result: Result<MessageResponse, ApiError> = self.gateway.delete(&path).await;
        match result {
            Ok(response) => {
                let message = response
                    .message
                    .as_deref()
                    .unwrap_or("Parking lot deleted successfully!");
                self.notifier.show(message, Severity::Success);
                Ok(())
            }
            Err(err) => Err(self.failure(err, "Failed to delete parking lot")),
        }
    }

    /// The spot grid of one lot, with per-spot occupancy status.
    pub async fn lot_spots(&self, lot_id: u64) -> Result<Vec<ParkingSpot>, ParklineError> {
        let path = format!("/admin/parking-lots/{lot_id}/spots");
        let result: Result<SpotsResponse, ApiError> = self.gateway.get(&path).await;
        match result {
            Ok(response) => Ok(response.spots),
            Err(err) => Err(self.failure(err, "Failed to fetch parking spots")),
        }
    }

    // --- Accounts ------------------------------------------------------------

    /// One page of registered accounts.
    pub async fn users(&self, page: u32) -> Result<UsersPage, ParklineError> {
        let result: Result<UsersPage, ApiError> = self
            .gateway
            .get_query("/admin/users", &[("page", page.to_string())])
            .await;
        result.map_err(|err| self.failure(err, "Failed to fetch users"))
    }

    /// Enables or disables an account. A disabled account cannot sign
    /// in; its history stays.
    pub async fn set_user_active(&self, user_id: u64, active: bool) -> Result<(), ParklineError> {
        let path = format!("/admin/users/{user_id}");
        let body = serde_json::json!({ "is_active": active });
        let result: Result<MessageResponse, ApiError> = self.gateway.put(&path, &body).await;
        match result {
            Ok(response) => {
                let message = response
                    .message
                    .as_deref()
                    .unwrap_or("User updated successfully!");
                self.notifier.show(message, Severity::Success);
                Ok(())
            }
            Err(err) => Err(self.failure(err, "Failed to update user")),
        }
    }

    /// One page of a single account's reservation history.
    pub async fn user_reservations(
        &self,
        user_id: u64,
        page: u32,
    ) -> Result<ReservationPage, ParklineError> {
        let path = format!("/admin/users/{user_id}/reservations");
        let result: Result<ReservationPage, ApiError> = self
            .gateway
            .get_query(&path, &[("page", page.to_string())])
            .await;
        result.map_err(|err| self.failure(err, "Failed to fetch user reservations"))
    }

    // --- Reservations ----------------------------------------------------------

    /// One page of reservations across all users and lots.
    pub async fn reservations(&self, page: u32) -> Result<ReservationPage, ParklineError> {
        let result: Result<ReservationPage, ApiError> = self
            .gateway
            .get_query("/admin/reservations", &[("page", page.to_string())])
            .await;
        result.map_err(|err| self.failure(err, "Failed to fetch reservations"))
    }

    // --- Plumbing ----------------------------------------------------------------

    fn lot_outcome(
        &self,
        result: Result<LotResponse, ApiError>,
        success: &str,
        fallback: &str,
    ) -> Result<ParkingLot, ParklineError> {
        match result {
            Ok(response) => {
                let message = response.message.as_deref().unwrap_or(success);
                self.notifier.show(message, Severity::Success);
                Ok(response.parking_lot)
            }
            Err(err) => Err(self.failure(err, fallback)),
        }
    }

    fn failure(&self, err: ApiError, fallback: &str) -> ParklineError {
        self.notifier
            .show(err.user_message(fallback), Severity::Danger);
        err.into()
    }
}
