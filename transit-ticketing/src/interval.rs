use serde::Serialize;
use uuid::Uuid;

use transit_core::{TransitError, TransitResult};
use transit_network::RouteTopology;

/// Half-open reservation interval `[pickup_order, destination_order)` over a
/// route's place order. A booking without pickup/destination claims the whole
/// route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatSegment {
    pub start: u32,
    pub end: u32,
}

impl SeatSegment {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Conservative whole-trip exclusivity: `[0, last_order + 1)`.
    pub fn whole_route(topology: &RouteTopology) -> Self {
        Self::new(0, topology.last_order() + 1)
    }

    /// Two half-open intervals overlap unless one ends before the other starts.
    pub fn overlaps(&self, other: &SeatSegment) -> bool {
        !(self.end <= other.start || other.end <= self.start)
    }

    /// Strictly validated interval for an incoming booking request: pickup and
    /// destination are both present or both absent, both must resolve on the
    /// route, and pickup must precede destination.
    pub fn for_request(
        topology: &RouteTopology,
        pickup: Option<Uuid>,
        destination: Option<Uuid>,
    ) -> TransitResult<Self> {
        match (pickup, destination) {
            (None, None) => Ok(Self::whole_route(topology)),
            (Some(p), Some(d)) => {
                let start = topology.order_of(p).ok_or_else(|| {
                    TransitError::Validation("pickup place is not on the schedule's route".into())
                })?;
                let end = topology.order_of(d).ok_or_else(|| {
                    TransitError::Validation(
                        "destination place is not on the schedule's route".into(),
                    )
                })?;
                if start >= end {
                    return Err(TransitError::Validation(
                        "pickup must come before destination on the route".into(),
                    ));
                }
                Ok(Self::new(start, end))
            }
            _ => Err(TransitError::Validation(
                "pickup and destination must be provided together".into(),
            )),
        }
    }

    /// Interval of an already-stored booking. Stored bookings predate route
    /// edits, so anything unresolvable falls back to whole-route exclusivity
    /// rather than silently freeing the seat.
    pub fn for_stored(
        topology: &RouteTopology,
        pickup: Option<Uuid>,
        destination: Option<Uuid>,
    ) -> Self {
        Self::for_request(topology, pickup, destination)
            .unwrap_or_else(|_| Self::whole_route(topology))
    }
}

impl std::fmt::Display for SeatSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
