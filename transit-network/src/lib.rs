pub mod geofence;
pub mod topology;

pub use geofence::{GeofenceStopDetector, StopMatch};
pub use topology::{RoutePoint, RouteTopology};
