use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A dated, timed run of a vehicle on a route at a fixed per-seat price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSchedule {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub route_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    /// Price per seat for the whole route.
    pub price: f64,
}

impl VehicleSchedule {
    pub fn new(
        vehicle_id: Uuid,
        route_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            route_id,
            date,
            time,
            price,
        }
    }
}
