use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::vehicle::SeatRef;
use crate::geo::GeoPoint;

/// Who occupies a seat: a registered user or an anonymous walk-up guest.
/// Exactly one of the two; the invalid "both"/"neither" shapes of the legacy
/// wire format are rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Passenger {
    Registered { user_id: Uuid },
    Guest,
}

impl Passenger {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Passenger::Registered { user_id } => Some(*user_id),
            Passenger::Guest => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Passenger::Guest)
    }
}

/// A pre-sold reservation of one or more seats on a schedule, bounded to a
/// route segment when pickup/destination are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketBooking {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub passenger: Passenger,
    pub name: String,
    pub phone: String,
    pub ticket_id: String,
    /// Passenger reference code: configured prefix + ticket id.
    pub pnr: String,
    pub seats: Vec<SeatRef>,
    pub pickup_place_id: Option<Uuid>,
    pub destination_place_id: Option<Uuid>,
    pub price: f64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// A geo-stamped check-in or check-out event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckPoint {
    pub position: GeoPoint,
    pub at: DateTime<Utc>,
    pub address: String,
}

/// One physical seat occupancy during a live trip, from check-in to check-out.
/// At most one booking per seat is open (check_out == None) at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatBooking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub seat_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub passenger: Passenger,
    pub check_in: CheckPoint,
    pub check_out: Option<CheckPoint>,
    pub trip_distance_km: Option<f64>,
    pub trip_duration_secs: Option<i64>,
    pub trip_amount: Option<f64>,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
}

impl SeatBooking {
    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }
}
