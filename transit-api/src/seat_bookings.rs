use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use transit_shared::models::SeatBooking;
use transit_shared::GeoPoint;
use transit_trips::{CheckIn, Checkout};

use crate::error::AppError;
use crate::requests::resolve_passenger;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/seat-bookings/book", post(check_in))
        .route("/v1/seat-bookings/switch", post(switch_seat))
        .route("/v1/seat-bookings/checkout", post(checkout))
}

#[derive(Debug, Deserialize)]
struct CheckInRequest {
    vehicle_id: Uuid,
    seat_id: Uuid,
    user_id: Option<Uuid>,
    is_guest: Option<bool>,
    lat: f64,
    lng: f64,
    #[serde(default)]
    address: String,
}

async fn check_in(
    State(state): State<AppState>,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<SeatBooking>, AppError> {
    let passenger = resolve_passenger(req.user_id, req.is_guest)?;
    let booking = state
        .boarding
        .check_in(CheckIn {
            vehicle_id: req.vehicle_id,
            seat_id: req.seat_id,
            passenger,
            position: GeoPoint::new(req.lat, req.lng),
            at: Utc::now(),
            address: req.address,
        })
        .await?;
    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
struct SwitchSeatRequest {
    current_seat_id: Uuid,
    new_seat_id: Uuid,
}

async fn switch_seat(
    State(state): State<AppState>,
    Json(req): Json<SwitchSeatRequest>,
) -> Result<Json<SeatBooking>, AppError> {
    let booking = state
        .boarding
        .switch_seat(req.current_seat_id, req.new_seat_id)
        .await?;
    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    seat_id: Uuid,
    lat: f64,
    lng: f64,
    #[serde(default)]
    address: String,
    #[serde(default)]
    is_paid: bool,
}

async fn checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<SeatBooking>, AppError> {
    let booking = state
        .boarding
        .checkout(Checkout {
            seat_id: req.seat_id,
            position: GeoPoint::new(req.lat, req.lng),
            address: req.address,
            is_paid: req.is_paid,
        })
        .await?;
    Ok(Json(booking))
}
