use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use transit_shared::models::Location;
use transit_shared::GeoPoint;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/locations", post(record_location))
}

#[derive(Debug, Deserialize)]
struct LocationRequest {
    vehicle_id: Uuid,
    trip_id: Option<Uuid>,
    lat: f64,
    lng: f64,
    speed_kmh: Option<f64>,
    course: Option<f64>,
}

async fn record_location(
    State(state): State<AppState>,
    Json(req): Json<LocationRequest>,
) -> Result<Json<Location>, AppError> {
    let location = state
        .trips
        .record_location(
            req.vehicle_id,
            req.trip_id,
            GeoPoint::new(req.lat, req.lng),
            req.speed_kmh,
            req.course,
        )
        .await?;
    Ok(Json(location))
}
