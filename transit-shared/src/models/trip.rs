use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// One run of a vehicle over a route, from start to end. A vehicle has at most
/// one trip with `end_time == None` at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    /// Public trip reference, `T-<YYYYMMDD>-<vehicleId>-<8 hex chars>`.
    pub trip_id: String,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub route_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub is_scheduled: bool,
    pub schedule_id: Option<Uuid>,
}

impl Trip {
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Append a remark line, preserving earlier remarks.
    pub fn push_remark(&mut self, remark: &str) {
        match &mut self.remarks {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(remark);
            }
            None => self.remarks = Some(remark.to_string()),
        }
    }
}

/// An append-only location fix for a vehicle, optionally tied to a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub position: GeoPoint,
    pub speed_kmh: Option<f64>,
    pub course: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl Location {
    pub fn new(vehicle_id: Uuid, trip_id: Option<Uuid>, position: GeoPoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            trip_id,
            position,
            speed_kmh: None,
            course: None,
            recorded_at: Utc::now(),
        }
    }
}

/// A driver's connection to a vehicle on a chosen route. Created when the
/// driver connects, cleared when the trip ends; the vehicle must be
/// reconnected before its next trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSession {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub route_id: Uuid,
    pub started_at: DateTime<Utc>,
}
