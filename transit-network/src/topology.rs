use std::collections::HashMap;

use uuid::Uuid;

use transit_core::{TransitError, TransitResult};
use transit_shared::models::{Place, Route};

/// One ordered point on a route: the start (order 0), an intermediate stop,
/// or the end (order n+1).
#[derive(Debug, Clone)]
pub struct RoutePoint {
    pub place: Place,
    pub order: u32,
    pub announcement_text: Option<String>,
}

/// Total order over a route's places: start = 0, stops 1..n by ascending
/// `order` field, end = n+1.
#[derive(Debug, Clone)]
pub struct RouteTopology {
    points: Vec<RoutePoint>,
    orders: HashMap<Uuid, u32>,
}

impl RouteTopology {
    /// Build the topology, validating the route's stop invariants: stop
    /// orders strictly increasing, and the start/end places never duplicated
    /// among the stops.
    pub fn new(route: &Route) -> TransitResult<Self> {
        let mut stops: Vec<_> = route.stops.iter().collect();
        stops.sort_by_key(|s| s.order);

        let mut last_raw: Option<u32> = None;
        for stop in &stops {
            if let Some(prev) = last_raw {
                if stop.order <= prev {
                    return Err(TransitError::Validation(format!(
                        "route {} has non-increasing stop order {} after {}",
                        route.id, stop.order, prev
                    )));
                }
            }
            last_raw = Some(stop.order);

            if stop.place.id == route.start.id || stop.place.id == route.end.id {
                return Err(TransitError::Validation(format!(
                    "route {} lists its start/end place {} as an intermediate stop",
                    route.id, stop.place.name
                )));
            }
        }

        let mut points = Vec::with_capacity(stops.len() + 2);
        points.push(RoutePoint {
            place: route.start.clone(),
            order: 0,
            announcement_text: None,
        });
        for (i, stop) in stops.iter().enumerate() {
            points.push(RoutePoint {
                place: stop.place.clone(),
                order: (i + 1) as u32,
                announcement_text: stop.announcement_text.clone(),
            });
        }
        points.push(RoutePoint {
            place: route.end.clone(),
            order: (stops.len() + 1) as u32,
            announcement_text: None,
        });

        let mut orders = HashMap::with_capacity(points.len());
        for point in &points {
            if orders.insert(point.place.id, point.order).is_some() {
                return Err(TransitError::Validation(format!(
                    "route {} visits place {} more than once",
                    route.id, point.place.name
                )));
            }
        }

        Ok(Self { points, orders })
    }

    /// Map of place id to its position on the route.
    pub fn place_order(&self) -> &HashMap<Uuid, u32> {
        &self.orders
    }

    pub fn order_of(&self, place_id: Uuid) -> Option<u32> {
        self.orders.get(&place_id).copied()
    }

    /// True only when both places are on the route and `from` precedes `to`.
    /// Unknown ids yield false; callers treat that as a validation failure.
    pub fn is_before(&self, from: Uuid, to: Uuid) -> bool {
        match (self.order_of(from), self.order_of(to)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// The end place's order (n+1 for n stops).
    pub fn last_order(&self) -> u32 {
        (self.points.len() - 1) as u32
    }

    /// All route points in travel order.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }
}
