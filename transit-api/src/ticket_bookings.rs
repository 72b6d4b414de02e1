use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use transit_shared::models::{SeatSelection, TicketBooking};
use transit_ticketing::CreateTicketBooking;

use crate::error::AppError;
use crate::requests::resolve_passenger;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/ticket-bookings", post(create_ticket_booking))
}

#[derive(Debug, Deserialize)]
struct TicketBookingRequest {
    schedule_id: Uuid,
    /// Accepts a single seat object or a list of them.
    seats: SeatSelection,
    pickup_place_id: Option<Uuid>,
    destination_place_id: Option<Uuid>,
    user_id: Option<Uuid>,
    is_guest: Option<bool>,
    name: String,
    phone: String,
    #[serde(default)]
    is_paid: bool,
}

async fn create_ticket_booking(
    State(state): State<AppState>,
    Json(req): Json<TicketBookingRequest>,
) -> Result<Json<TicketBooking>, AppError> {
    let passenger = resolve_passenger(req.user_id, req.is_guest)?;
    let booking = state
        .ticketing
        .create_ticket_booking(CreateTicketBooking {
            schedule_id: req.schedule_id,
            seats: req.seats.into_vec(),
            pickup_place_id: req.pickup_place_id,
            destination_place_id: req.destination_place_id,
            passenger,
            name: req.name,
            phone: req.phone,
            is_paid: req.is_paid,
        })
        .await?;
    Ok(Json(booking))
}
