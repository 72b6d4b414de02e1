pub mod geo;
pub mod models;

pub use geo::{haversine_km, round2, GeoPoint};
