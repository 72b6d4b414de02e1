use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::place::Place;

/// An intermediate stop on a route. `order` positions the stop between the
/// route start (0) and end; values must be strictly increasing along the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStop {
    pub place: Place,
    pub order: u32,
    pub announcement_text: Option<String>,
}

/// A fixed route from a start place to an end place through ordered stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub is_bidirectional: bool,
    pub start: Place,
    pub end: Place,
    pub stops: Vec<RouteStop>,
}

impl Route {
    pub fn new(name: impl Into<String>, start: Place, end: Place) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_bidirectional: false,
            start,
            end,
            stops: Vec::new(),
        }
    }

    pub fn with_stop(mut self, place: Place, order: u32) -> Self {
        self.stops.push(RouteStop {
            place,
            order,
            announcement_text: None,
        });
        self
    }
}
