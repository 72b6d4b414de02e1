use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// A named stop/terminal on the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub position: GeoPoint,
    pub address: Option<String>,
}

impl Place {
    pub fn new(name: impl Into<String>, code: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            position: GeoPoint::new(lat, lng),
            address: None,
        }
    }
}
