use serde::Serialize;

use transit_core::TransitRules;
use transit_shared::geo::{haversine_km, GeoPoint};
use transit_shared::models::Place;

use crate::topology::{RoutePoint, RouteTopology};

/// Announcement text is capped so a runaway template never floods clients.
const ANNOUNCEMENT_MAX_CHARS: usize = 500;

/// A stop the vehicle is currently within geofence range of.
#[derive(Debug, Clone, Serialize)]
pub struct StopMatch {
    pub place: Place,
    pub order: u32,
    pub distance_km: f64,
    pub announcement: String,
}

/// Finds which covered stop (if any) a live position corresponds to and
/// renders its arrival announcement.
pub struct GeofenceStopDetector {
    rules: TransitRules,
}

impl GeofenceStopDetector {
    pub fn new(rules: TransitRules) -> Self {
        Self { rules }
    }

    /// First route point within `point_cover_radius_km` of the position, in
    /// travel order. None means the vehicle is between stops.
    pub fn detect(&self, topology: &RouteTopology, position: GeoPoint) -> Option<StopMatch> {
        for point in topology.points() {
            let distance_km = haversine_km(position, point.place.position);
            if distance_km <= self.rules.point_cover_radius_km {
                tracing::debug!(
                    place = %point.place.name,
                    order = point.order,
                    distance_km,
                    "position covered by stop geofence"
                );
                return Some(StopMatch {
                    place: point.place.clone(),
                    order: point.order,
                    distance_km,
                    announcement: self.announcement_for(point),
                });
            }
        }
        None
    }

    /// Announcement precedence: per-stop custom text, then the configured
    /// template with `$x`/`$X` substituted, then the bare place name.
    fn announcement_for(&self, point: &RoutePoint) -> String {
        let text = if let Some(custom) = &point.announcement_text {
            custom.clone()
        } else if let Some(template) = &self.rules.announcement_template {
            template
                .replace("$x", &point.place.name)
                .replace("$X", &point.place.name)
        } else {
            point.place.name.clone()
        };

        if text.chars().count() > ANNOUNCEMENT_MAX_CHARS {
            text.chars().take(ANNOUNCEMENT_MAX_CHARS).collect()
        } else {
            text
        }
    }
}
