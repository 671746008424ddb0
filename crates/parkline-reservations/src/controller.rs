//! The reservation controller: lifecycle operations over the gateway.

use std::sync::Arc;

use parking_lot::Mutex;
use parkline_api::{
    ApiError, DashboardResponse, ParkingLot, ParkingLotsResponse,
    Reservation, ReservationPage, ReservationRequest, ReservationResponse,
    ReservationStatus, Severity,
};
use parkline_gateway::Gateway;

use crate::{AlertSink, ReservationBook};

/// Drives the reservation lifecycle against the server.
///
/// Every operation follows the same shape: send the intent, apply the
/// authoritative record from the response to the book, raise an alert
/// with the outcome, and hand the result back to the caller. On failure
/// the book is untouched; the alert carries the server's wording when
/// the server provided any.
pub struct ReservationController<A: AlertSink> {
    gateway: Arc<Gateway>,
    book: Mutex<ReservationBook>,
    alerts: A,
}

impl<A: AlertSink> ReservationController<A> {
    /// Creates a controller with an empty book.
    pub fn new(gateway: Arc<Gateway>, alerts: A) -> Self {
        Self {
            gateway,
            book: Mutex::new(ReservationBook::new()),
            alerts,
        }
    }

    // --- Lifecycle operations --------------------------------------------

    /// Reserves a spot. The server picks the spot; the request names
    /// only the lot and the vehicle.
    pub async fn reserve(
        &self,
        request: &ReservationRequest,
    ) -> Result<Reservation, ApiError> {
        let result: Result<ReservationResponse, ApiError> =
            self.gateway.post("/user/reservations", request).await;

        match result {
            Ok(response) => {
                tracing::info!(
                    reservation_id = response.reservation.id,
                    lot_id = request.lot_id,
                    "reservation created"
                );
                self.apply(|book| book.apply_created(response.reservation.clone()));
                self.success(&response, "Reservation created successfully!");
                Ok(response.reservation)
            }
            Err(err) => Err(self.failure(err, "Failed to create reservation")),
        }
    }

    /// Marks the reserved spot as occupied. The server stamps the
    /// parking time and flips the status to active.
    pub async fn park(&self, reservation_id: u64) -> Result<Reservation, ApiError> {
        self.transition(
            reservation_id,
            "park",
            "Vehicle parked successfully!",
            "Failed to park vehicle",
        )
        .await
    }

    /// Vacates the spot. The server stamps the leaving time, computes
    /// the cost, and flips the status to completed.
    pub async fn release(&self, reservation_id: u64) -> Result<Reservation, ApiError> {
        self.transition(
            reservation_id,
            "release",
            "Parking released successfully!",
            "Failed to release parking",
        )
        .await
    }

    /// Cancels a reservation that was never parked. The wire call is
    /// the same release; the server answers a reserved record with a
    /// cancelled one, and the book's terminal-eviction rule does the
    /// rest.
    pub async fn cancel(&self, reservation_id: u64) -> Result<Reservation, ApiError> {
        self.transition(
            reservation_id,
            "release",
            "Reservation cancelled successfully!",
            "Failed to cancel reservation",
        )
        .await
    }

    /// Every transition is the same wire shape: an empty POST to an
    /// action path (`park` or `release`), answered with the updated
    /// record.
    async fn transition(
        &self,
        reservation_id: u64,
        action: &str,
        success: &str,
        fallback: &str,
    ) -> Result<Reservation, ApiError> {
        let path = format!("/user/reservations/{reservation_id}/{action}");
        let result: Result<ReservationResponse, ApiError> =
            self.gateway.post_empty(&path).await;

        match result {
            Ok(response) => {
                tracing::info!(reservation_id, action, "reservation transitioned");
                self.apply(|book| book.apply_updated(response.reservation.clone()));
                self.success(&response, success);
                Ok(response.reservation)
            }
            Err(err) => Err(self.failure(err, fallback)),
        }
    }

    // --- Fetches -----------------------------------------------------------

    /// Fetches one page of reservation history. Pages are 1-indexed;
    /// `status` narrows the page server-side.
    ///
    /// Only an unfiltered first page replaces the cached history;
    /// deeper or filtered pages are handed back for display without
    /// touching the cache, so the cache always holds the newest
    /// unfiltered records.
    pub async fn fetch_history(
        &self,
        page: u32,
        per_page: u32,
        status: Option<ReservationStatus>,
    ) -> Result<ReservationPage, ApiError> {
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(status) = status {
            query.push(("status", status.to_string()));
        }

        let result: Result<ReservationPage, ApiError> = self
            .gateway
            .get_query("/user/reservations", &query)
            .await;

        match result {
            Ok(fetched) => {
                if page == 1 && status.is_none() {
                    self.apply(|book| book.replace_history(fetched.reservations.clone()));
                }
                Ok(fetched)
            }
            Err(err) => Err(self.failure(err, "Failed to fetch reservation history")),
        }
    }

    /// Fetches the active lot inventory.
    pub async fn fetch_lots(&self) -> Result<Vec<ParkingLot>, ApiError> {
        let result: Result<ParkingLotsResponse, ApiError> =
            self.gateway.get("/user/parking-lots").await;

        match result {
            Ok(response) => {
                self.apply(|book| book.set_lots(response.parking_lots.clone()));
                Ok(response.parking_lots)
            }
            Err(err) => Err(self.failure(err, "Failed to fetch parking lots")),
        }
    }

    /// Fetches the dashboard summary and adopts its view wholesale:
    /// the current slot and the recent history both come from the
    /// payload. This is how a fresh session discovers an in-flight
    /// reservation made before the restart.
    pub async fn fetch_dashboard(&self) -> Result<DashboardResponse, ApiError> {
        let result: Result<DashboardResponse, ApiError> =
            self.gateway.get("/user/dashboard").await;

        match result {
            Ok(dashboard) => {
                self.apply(|book| {
                    book.replace_history(dashboard.recent_reservations.clone());
                    book.set_current(dashboard.active_reservation.clone());
                });
                Ok(dashboard)
            }
            Err(err) => Err(self.failure(err, "Failed to fetch dashboard data")),
        }
    }

    // --- Reads ---------------------------------------------------------------

    /// Copy of the in-flight reservation, if any.
    pub fn current(&self) -> Option<Reservation> {
        self.book.lock().current().cloned()
    }

    /// Copy of the cached history, newest first.
    pub fn history(&self) -> Vec<Reservation> {
        self.book.lock().history().to_vec()
    }

    /// Copy of the cached lot inventory.
    pub fn lots(&self) -> Vec<ParkingLot> {
        self.book.lock().lots().to_vec()
    }

    /// Drops all cached state. Called when the session ends; the next
    /// user must not see the previous user's reservations.
    pub fn reset(&self) {
        *self.book.lock() = ReservationBook::new();
    }

    // --- Plumbing --------------------------------------------------------------

    fn apply(&self, mutate: impl FnOnce(&mut ReservationBook)) {
        let mut book = self.book.lock();
        mutate(&mut book);
        debug_assert!(book.is_consistent());
    }

    fn success(&self, response: &ReservationResponse, fallback: &str) {
        let message = response.message.as_deref().unwrap_or(fallback);
        self.alerts.alert(message, Severity::Success);
    }

    fn failure(&self, err: ApiError, fallback: &str) -> ApiError {
        tracing::debug!(error = %err, "reservation operation failed");
        self.alerts.alert(&err.user_message(fallback), Severity::Danger);
        err
    }
}
