use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use transit_core::repository::VehicleRepository;
use transit_core::TransitError;
use transit_shared::models::VehicleSeat;
use transit_shared::GeoPoint;
use transit_trips::{CurrentStopReport, EndTrip, StartTrip, TripEnd, TripStart};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vehicles/connect", post(connect_vehicle))
        .route("/v1/vehicles/{id}/seats", get(vehicle_seats))
        .route("/v1/trips/start", post(start_trip))
        .route("/v1/trips/{id}/end", post(end_trip))
        .route("/v1/trips/{id}/current-stop", get(current_stop))
}

/// Seat layout with live occupancy, ordered side then number.
async fn vehicle_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VehicleSeat>>, AppError> {
    if state.store.get_vehicle(id).await?.is_none() {
        return Err(TransitError::NotFound(format!("vehicle {}", id)).into());
    }
    Ok(Json(state.store.list_seats(id).await?))
}

#[derive(Debug, Deserialize)]
struct ConnectRequest {
    vehicle_id: Uuid,
    driver_id: Uuid,
    route_id: Uuid,
}

async fn connect_vehicle(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<Value>, AppError> {
    let session = state
        .trips
        .connect_vehicle(req.vehicle_id, req.driver_id, req.route_id)
        .await?;
    Ok(Json(json!({ "session": session })))
}

#[derive(Debug, Deserialize)]
struct StartTripRequest {
    vehicle_id: Uuid,
    driver_id: Uuid,
    schedule_id: Option<Uuid>,
    lat: Option<f64>,
    lng: Option<f64>,
}

async fn start_trip(
    State(state): State<AppState>,
    Json(req): Json<StartTripRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state
        .trips
        .start_trip(StartTrip {
            vehicle_id: req.vehicle_id,
            driver_id: req.driver_id,
            schedule_id: req.schedule_id,
            position: match (req.lat, req.lng) {
                (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
                _ => None,
            },
        })
        .await?;

    let body = match outcome {
        TripStart::Started(trip) => json!({ "status": "started", "trip": trip }),
        TripStart::ConfirmScheduled { schedule, tickets } => json!({
            "status": "confirm_schedule",
            "schedule": schedule,
            "tickets": tickets,
        }),
    };
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
struct EndTripRequest {
    driver_id: Uuid,
    lat: f64,
    lng: f64,
    #[serde(default)]
    confirm_out_of_range: bool,
}

async fn end_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EndTripRequest>,
) -> Result<Json<Value>, AppError> {
    let outcome = state
        .trips
        .end_trip(EndTrip {
            trip_id: id,
            driver_id: req.driver_id,
            position: GeoPoint::new(req.lat, req.lng),
            confirm_out_of_range: req.confirm_out_of_range,
        })
        .await?;

    let body = match outcome {
        TripEnd::Ended {
            trip,
            within_destination,
        } => json!({
            "status": "ended",
            "trip": trip,
            "within_destination": within_destination,
        }),
        TripEnd::OutOfRange { distance_km } => json!({
            "status": "confirm_out_of_range",
            "distance_km": distance_km,
        }),
    };
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
struct CurrentStopQuery {
    lat: f64,
    lng: f64,
}

async fn current_stop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<CurrentStopQuery>,
) -> Result<Json<CurrentStopReport>, AppError> {
    let report = state
        .trips
        .current_stop(id, GeoPoint::new(q.lat, q.lng))
        .await?;
    Ok(Json(report))
}
