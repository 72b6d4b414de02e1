use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use transit_core::repository::{SeatBookingRepository, TripRepository, VehicleRepository};
use transit_core::{Settlement, TransitError, TransitResult, TransitRules, WalletLedger};
use transit_shared::geo::{haversine_km, round2, GeoPoint};
use transit_shared::models::{CheckPoint, Passenger, SeatBooking, SeatStatus, VehicleSeat};
use transit_store::{LeaseKey, LeaseMap};

#[derive(Debug, Clone)]
pub struct CheckIn {
    pub vehicle_id: Uuid,
    pub seat_id: Uuid,
    pub passenger: Passenger,
    pub position: GeoPoint,
    pub at: DateTime<Utc>,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct Checkout {
    pub seat_id: Uuid,
    pub position: GeoPoint,
    pub address: String,
    pub is_paid: bool,
}

/// Walk-up seat occupancy on a live trip: check-in, seat switch, and checkout
/// with distance/duration/fare computation and wallet credits.
pub struct AdHocSeatBookingEngine {
    vehicles: Arc<dyn VehicleRepository>,
    trips: Arc<dyn TripRepository>,
    seat_bookings: Arc<dyn SeatBookingRepository>,
    wallet: Arc<dyn WalletLedger>,
    leases: Arc<LeaseMap>,
    rules: TransitRules,
}

impl AdHocSeatBookingEngine {
    pub fn new(
        vehicles: Arc<dyn VehicleRepository>,
        trips: Arc<dyn TripRepository>,
        seat_bookings: Arc<dyn SeatBookingRepository>,
        wallet: Arc<dyn WalletLedger>,
        leases: Arc<LeaseMap>,
        rules: TransitRules,
    ) -> Self {
        Self {
            vehicles,
            trips,
            seat_bookings,
            wallet,
            leases,
            rules,
        }
    }

    pub async fn check_in(&self, req: CheckIn) -> TransitResult<SeatBooking> {
        let _lease = self.leases.acquire(LeaseKey::Vehicle(req.vehicle_id)).await;

        if self.vehicles.get_vehicle(req.vehicle_id).await?.is_none() {
            return Err(TransitError::NotFound(format!("vehicle {}", req.vehicle_id)));
        }
        let seat = self.resolve_seat(req.seat_id).await?;
        if seat.vehicle_id != req.vehicle_id {
            return Err(TransitError::Validation(
                "seat does not belong to this vehicle".into(),
            ));
        }
        if seat.status != SeatStatus::Available {
            return Err(TransitError::Conflict(format!(
                "seat {} is not available",
                seat.label()
            )));
        }

        // Attach to the vehicle's live trip when one is running.
        let trip = self.trips.active_trip_for_vehicle(req.vehicle_id).await?;

        let booking = SeatBooking {
            id: Uuid::new_v4(),
            vehicle_id: req.vehicle_id,
            seat_id: seat.id,
            trip_id: trip.as_ref().map(|t| t.id),
            passenger: req.passenger,
            check_in: CheckPoint {
                position: req.position,
                at: req.at,
                address: req.address,
            },
            check_out: None,
            trip_distance_km: None,
            trip_duration_secs: None,
            trip_amount: None,
            is_paid: false,
            created_at: Utc::now(),
        };
        self.seat_bookings.insert_seat_booking(booking.clone()).await?;
        self.vehicles
            .set_seat_status(seat.id, SeatStatus::Booked)
            .await?;

        tracing::info!(
            vehicle = %req.vehicle_id,
            seat = %seat.label(),
            trip = ?trip.map(|t| t.trip_id),
            "passenger checked in"
        );
        Ok(booking)
    }

    /// Move the latest open occupancy from one seat to another on the same
    /// vehicle, flipping both seat statuses.
    pub async fn switch_seat(
        &self,
        current_seat_id: Uuid,
        new_seat_id: Uuid,
    ) -> TransitResult<SeatBooking> {
        let current = self.resolve_seat(current_seat_id).await?;
        let _lease = self
            .leases
            .acquire(LeaseKey::Vehicle(current.vehicle_id))
            .await;

        let new_seat = self.resolve_seat(new_seat_id).await?;
        if new_seat.vehicle_id != current.vehicle_id {
            return Err(TransitError::Validation(
                "new seat does not belong to the same vehicle".into(),
            ));
        }
        if new_seat.status != SeatStatus::Available {
            return Err(TransitError::Conflict(format!(
                "seat {} is not available",
                new_seat.label()
            )));
        }

        let mut booking = self
            .seat_bookings
            .open_booking_for_seat(current.id)
            .await?
            .ok_or_else(|| {
                TransitError::NotFound(format!("open booking for seat {}", current.label()))
            })?;

        booking.seat_id = new_seat.id;
        self.seat_bookings.update_seat_booking(booking.clone()).await?;
        self.vehicles
            .set_seat_status(current.id, SeatStatus::Available)
            .await?;
        self.vehicles
            .set_seat_status(new_seat.id, SeatStatus::Booked)
            .await?;

        tracing::info!(
            from = %current.label(),
            to = %new_seat.label(),
            "seat switched"
        );
        Ok(booking)
    }

    /// Close the open occupancy on a seat, computing distance, duration and
    /// fare. The wallet settlement commits as one all-or-nothing call before
    /// the domain mutation; a ledger failure surfaces as Upstream with no
    /// state change on either side.
    pub async fn checkout(&self, req: Checkout) -> TransitResult<SeatBooking> {
        let seat = self.resolve_seat(req.seat_id).await?;
        let _lease = self.leases.acquire(LeaseKey::Vehicle(seat.vehicle_id)).await;

        let mut booking = self
            .seat_bookings
            .open_booking_for_seat(seat.id)
            .await?
            .ok_or_else(|| {
                TransitError::NotFound(format!("open booking for seat {}", seat.label()))
            })?;

        let now = Utc::now();
        let raw_distance_km = haversine_km(booking.check_in.position, req.position);
        let distance_km = round2(raw_distance_km);
        let duration_secs = (now - booking.check_in.at).num_seconds();

        let trip = match booking.trip_id {
            Some(id) => self.trips.get_trip(id).await?,
            None => None,
        };
        let on_scheduled_trip = trip.as_ref().map(|t| t.is_scheduled).unwrap_or(false);

        // A scheduled occupancy already carries its share of the ticket
        // price; only recompute when there is no positive preset amount.
        let trip_amount = match booking.trip_amount {
            Some(preset) if on_scheduled_trip && preset > 0.0 => preset,
            _ => round2(raw_distance_km * self.rules.per_km_charge),
        };

        if trip_amount > 0.0 {
            let to_pay = booking
                .passenger
                .user_id()
                .map(|user_id| (user_id, format!("Trip amount - seat booking {}", booking.id)));
            let to_receive = trip.as_ref().filter(|t| !t.is_scheduled).map(|t| {
                (
                    t.driver_id,
                    format!("Trip amount (driver) - seat booking {}", booking.id),
                )
            });
            // Both legs go through one ledger call; a failure credits
            // neither side and the booking stays open for a retry.
            if to_pay.is_some() || to_receive.is_some() {
                self.wallet
                    .credit_settlement(Settlement {
                        amount: trip_amount,
                        to_pay,
                        to_receive,
                    })
                    .await
                    .map_err(|e| TransitError::Upstream(e.to_string()))?;
            }
        }

        booking.check_out = Some(CheckPoint {
            position: req.position,
            at: now,
            address: req.address,
        });
        booking.trip_distance_km = Some(distance_km);
        booking.trip_duration_secs = Some(duration_secs);
        booking.trip_amount = Some(trip_amount);
        booking.is_paid = req.is_paid;

        self.seat_bookings.update_seat_booking(booking.clone()).await?;
        self.vehicles
            .set_seat_status(seat.id, SeatStatus::Available)
            .await?;

        tracing::info!(
            seat = %seat.label(),
            distance_km,
            duration_secs,
            trip_amount,
            "passenger checked out"
        );
        Ok(booking)
    }

    async fn resolve_seat(&self, seat_id: Uuid) -> TransitResult<VehicleSeat> {
        self.vehicles
            .get_seat(seat_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("seat {}", seat_id)))
    }
}

#[cfg(test)]
mod tests;
