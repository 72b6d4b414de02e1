use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeatSide {
    A,
    B,
    C,
}

impl fmt::Display for SeatSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatSide::A => write!(f, "A"),
            SeatSide::B => write!(f, "B"),
            SeatSide::C => write!(f, "C"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
}

/// A (side, number) pair identifying one physical seat on a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRef {
    pub side: SeatSide,
    pub number: u32,
}

impl SeatRef {
    pub fn new(side: SeatSide, number: u32) -> Self {
        Self { side, number }
    }

    /// Seat label as shown to passengers, e.g. "A1".
    pub fn label(&self) -> String {
        format!("{}{}", self.side, self.number)
    }
}

impl fmt::Display for SeatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side, self.number)
    }
}

/// Seat field as accepted at the system boundary. Legacy clients send a single
/// seat object; current clients send a list. Normalized to a list once here so
/// engine code never branches on shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeatSelection {
    Many(Vec<SeatRef>),
    One(SeatRef),
}

impl SeatSelection {
    pub fn into_vec(self) -> Vec<SeatRef> {
        match self {
            SeatSelection::Many(seats) => seats,
            SeatSelection::One(seat) => vec![seat],
        }
    }
}

/// A physical seat with its live occupancy status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSeat {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub side: SeatSide,
    pub number: u32,
    pub status: SeatStatus,
}

impl VehicleSeat {
    pub fn new(vehicle_id: Uuid, side: SeatSide, number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            side,
            number,
            status: SeatStatus::Available,
        }
    }

    pub fn seat_ref(&self) -> SeatRef {
        SeatRef::new(self.side, self.number)
    }

    pub fn label(&self) -> String {
        self.seat_ref().label()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    /// Drivers allowed to connect to this vehicle.
    pub driver_ids: Vec<Uuid>,
    /// Routes this vehicle may run.
    pub route_ids: Vec<Uuid>,
    pub is_active: bool,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, vehicle_no: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            vehicle_no: vehicle_no.into(),
            vehicle_type: "bus".to_string(),
            driver_ids: Vec::new(),
            route_ids: Vec::new(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_label() {
        assert_eq!(SeatRef::new(SeatSide::A, 1).label(), "A1");
        assert_eq!(SeatRef::new(SeatSide::C, 12).label(), "C12");
    }

    #[test]
    fn test_seat_selection_normalizes_single_and_list() {
        let single: SeatSelection =
            serde_json::from_str(r#"{"side":"A","number":1}"#).unwrap();
        assert_eq!(single.into_vec(), vec![SeatRef::new(SeatSide::A, 1)]);

        let many: SeatSelection =
            serde_json::from_str(r#"[{"side":"A","number":1},{"side":"B","number":2}]"#).unwrap();
        assert_eq!(
            many.into_vec(),
            vec![SeatRef::new(SeatSide::A, 1), SeatRef::new(SeatSide::B, 2)]
        );
    }
}
