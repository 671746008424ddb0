//! The reservation book: the client's cache of reservation state.
//!
//! Holds three things and the rules that keep them coherent:
//!
//! - **current** — the one non-terminal reservation, if any. A user can
//!   hold at most one; the server enforces it, the book mirrors it.
//! - **history** — the cached page of past and present reservations,
//!   newest first.
//! - **lots** — the lot inventory as last fetched, including the
//!   server-computed availability counters.
//!
//! Every record that enters the book came from the server. The book
//! never edits fields inside a reservation; updates replace the whole
//! record.

use parkline_api::{ParkingLot, Reservation};

/// The cached reservation state.
///
/// ## Current-reservation rule
///
/// ```text
/// apply_created(reserved|active)  --> becomes current
/// apply_updated(same id, active)  --> stays current (record replaced)
/// apply_updated(same id, terminal) --> current cleared
/// ```
///
/// A terminal record (`completed`, `cancelled`) can never sit in the
/// current slot. [`is_consistent`](Self::is_consistent) checks exactly
/// that.
#[derive(Debug, Default)]
pub struct ReservationBook {
    current: Option<Reservation>,
    history: Vec<Reservation>,
    lots: Vec<ParkingLot>,
}

impl ReservationBook {
    /// An empty book.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Reads ---------------------------------------------------------

    /// The in-flight reservation, if one exists.
    pub fn current(&self) -> Option<&Reservation> {
        self.current.as_ref()
    }

    /// The cached history, newest first.
    pub fn history(&self) -> &[Reservation] {
        &self.history
    }

    /// The lot inventory as last fetched.
    pub fn lots(&self) -> &[ParkingLot] {
        &self.lots
    }

    // --- Writes --------------------------------------------------------

    /// Records a reservation the server just created.
    ///
    /// It enters the history at the front (newest first) and, when
    /// non-terminal, takes the current slot.
    pub fn apply_created(&mut self, reservation: Reservation) {
        if !reservation.status.is_terminal() {
            self.current = Some(reservation.clone());
        }
        self.history.insert(0, reservation);
    }

    /// Records the server's updated version of a reservation.
    ///
    /// The matching history entry is replaced wholesale; a record the
    /// history has never seen joins at the front. The current slot
    /// follows the record it holds: replaced while non-terminal,
    /// cleared the moment the record turns terminal.
    pub fn apply_updated(&mut self, reservation: Reservation) {
        match self.history.iter_mut().find(|r| r.id == reservation.id) {
            Some(entry) => *entry = reservation.clone(),
            None => self.history.insert(0, reservation.clone()),
        }

        if self
            .current
            .as_ref()
            .is_some_and(|current| current.id == reservation.id)
        {
            self.current = if reservation.status.is_terminal() {
                None
            } else {
                Some(reservation)
            };
        }
    }

    /// Replaces the cached history with a freshly fetched first page.
    pub fn replace_history(&mut self, reservations: Vec<Reservation>) {
        self.history = reservations;
    }

    /// Sets the current slot from an authoritative source (dashboard).
    /// A terminal record is refused; the slot is cleared instead. Any
    /// cached history entry for the same reservation is brought up to
    /// date with the new record.
    pub fn set_current(&mut self, reservation: Option<Reservation>) {
        self.current = reservation.filter(|r| !r.status.is_terminal());

        if let Some(current) = &self.current {
            for entry in self.history.iter_mut().filter(|r| r.id == current.id) {
                *entry = current.clone();
            }
        }
    }

    /// Replaces the lot inventory.
    pub fn set_lots(&mut self, lots: Vec<ParkingLot>) {
        self.lots = lots;
    }

    /// Checks the book's own rules: a current record is never terminal,
    /// and when the history carries an entry with the current record's
    /// id, the two are the same record. Used in debug assertions after
    /// every mutation path in the controller.
    pub fn is_consistent(&self) -> bool {
        self.current.as_ref().is_none_or(|current| {
            !current.status.is_terminal()
                && self
                    .history
                    .iter()
                    .filter(|r| r.id == current.id)
                    .all(|r| r == current)
        })
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use parkline_api::ReservationStatus;

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn reservation(id: u64, status: ReservationStatus) -> Reservation {
        Reservation {
            id,
            user_id: 1,
            spot_id: 10,
            parking_timestamp: None,
            leaving_timestamp: None,
            reservation_timestamp: None,
            parking_cost: None,
            status,
            vehicle_number: Some("KA-01-AB-1234".into()),
            remarks: None,
            duration_hours: None,
            parking_lot_name: Some("Central Lot".into()),
            spot_number: None,
            user_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    // =====================================================================
    // apply_created()
    // =====================================================================

    #[test]
    fn test_apply_created_reserved_becomes_current_and_newest() {
        let mut book = ReservationBook::new();
        book.replace_history(vec![reservation(1, ReservationStatus::Completed)]);

        book.apply_created(reservation(2, ReservationStatus::Reserved));

        assert_eq!(book.current().map(|r| r.id), Some(2));
        let ids: Vec<u64> = book.history().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(book.is_consistent());
    }

    #[test]
    fn test_apply_created_terminal_record_never_takes_current() {
        let mut book = ReservationBook::new();

        book.apply_created(reservation(1, ReservationStatus::Completed));

        assert!(book.current().is_none());
        assert_eq!(book.history().len(), 1);
    }

    // =====================================================================
    // apply_updated()
    // =====================================================================

    #[test]
    fn test_apply_updated_replaces_record_wholesale() {
        let mut book = ReservationBook::new();
        book.apply_created(reservation(1, ReservationStatus::Reserved));

        let mut parked = reservation(1, ReservationStatus::Active);
        parked.parking_cost = Some(40.0);
        book.apply_updated(parked);

        // Both the history entry and the current slot carry the new record.
        assert_eq!(book.history()[0].status, ReservationStatus::Active);
        assert_eq!(book.current().and_then(|r| r.parking_cost), Some(40.0));
    }

    #[test]
    fn test_apply_updated_terminal_evicts_current() {
        let mut book = ReservationBook::new();
        book.apply_created(reservation(1, ReservationStatus::Active));

        book.apply_updated(reservation(1, ReservationStatus::Completed));

        assert!(book.current().is_none());
        // The history keeps the completed record.
        assert_eq!(book.history()[0].status, ReservationStatus::Completed);
        assert!(book.is_consistent());
    }

    #[test]
    fn test_apply_updated_other_reservation_leaves_current_alone() {
        let mut book = ReservationBook::new();
        book.apply_created(reservation(1, ReservationStatus::Active));
        book.apply_created(reservation(2, ReservationStatus::Reserved));

        // An update to a record that is not current (id 1) must not
        // disturb the current slot (id 2).
        book.apply_updated(reservation(1, ReservationStatus::Completed));

        assert_eq!(book.current().map(|r| r.id), Some(2));
    }

    #[test]
    fn test_apply_updated_unseen_record_joins_history() {
        let mut book = ReservationBook::new();

        book.apply_updated(reservation(5, ReservationStatus::Cancelled));

        assert_eq!(book.history().len(), 1);
        assert!(book.current().is_none());
    }

    // =====================================================================
    // set_current() / replace_history()
    // =====================================================================

    #[test]
    fn test_set_current_refuses_terminal_records() {
        let mut book = ReservationBook::new();
        book.set_current(Some(reservation(1, ReservationStatus::Active)));
        assert!(book.current().is_some());

        book.set_current(Some(reservation(2, ReservationStatus::Cancelled)));

        assert!(book.current().is_none());
        assert!(book.is_consistent());
    }

    #[test]
    fn test_replace_history_overwrites_the_cache() {
        let mut book = ReservationBook::new();
        book.replace_history(vec![reservation(1, ReservationStatus::Completed)]);

        book.replace_history(vec![
            reservation(3, ReservationStatus::Active),
            reservation(2, ReservationStatus::Completed),
        ]);

        let ids: Vec<u64> = book.history().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }
}
