use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use transit_shared::models::{
    DriverSession, Location, Route, SeatBooking, SeatRef, SeatStatus, TicketBooking, Trip, Vehicle,
    VehicleSchedule, VehicleSeat,
};

use crate::TransitResult;

/// Route lookups. Routes carry their places denormalized, so resolving a
/// route is enough for topology and geofence work.
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn get_route(&self, id: Uuid) -> TransitResult<Option<Route>>;
}

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn get_vehicle(&self, id: Uuid) -> TransitResult<Option<Vehicle>>;
    async fn get_seat(&self, seat_id: Uuid) -> TransitResult<Option<VehicleSeat>>;
    /// Resolve a seat by its (side, number) pair on a vehicle.
    async fn find_seat(&self, vehicle_id: Uuid, seat: SeatRef)
        -> TransitResult<Option<VehicleSeat>>;
    async fn list_seats(&self, vehicle_id: Uuid) -> TransitResult<Vec<VehicleSeat>>;
    async fn set_seat_status(&self, seat_id: Uuid, status: SeatStatus) -> TransitResult<()>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get_schedule(&self, id: Uuid) -> TransitResult<Option<VehicleSchedule>>;
    async fn list_for_vehicle_on(
        &self,
        vehicle_id: Uuid,
        date: NaiveDate,
    ) -> TransitResult<Vec<VehicleSchedule>>;
}

#[async_trait]
pub trait TicketBookingRepository: Send + Sync {
    async fn insert_ticket_booking(&self, booking: TicketBooking) -> TransitResult<()>;
    async fn list_for_schedule(&self, schedule_id: Uuid) -> TransitResult<Vec<TicketBooking>>;
    async fn ticket_id_exists(&self, ticket_id: &str) -> TransitResult<bool>;
}

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn insert_trip(&self, trip: Trip) -> TransitResult<()>;
    async fn get_trip(&self, id: Uuid) -> TransitResult<Option<Trip>>;
    async fn update_trip(&self, trip: Trip) -> TransitResult<()>;
    /// The trip with `end_time == None` for this vehicle, if any.
    async fn active_trip_for_vehicle(&self, vehicle_id: Uuid) -> TransitResult<Option<Trip>>;
}

#[async_trait]
pub trait SeatBookingRepository: Send + Sync {
    async fn insert_seat_booking(&self, booking: SeatBooking) -> TransitResult<()>;
    async fn update_seat_booking(&self, booking: SeatBooking) -> TransitResult<()>;
    /// Latest open (not checked out) booking for a seat.
    async fn open_booking_for_seat(&self, seat_id: Uuid) -> TransitResult<Option<SeatBooking>>;
    async fn open_bookings_for_trip(&self, trip_id: Uuid) -> TransitResult<Vec<SeatBooking>>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn put_session(&self, session: DriverSession) -> TransitResult<()>;
    async fn session_for_vehicle(&self, vehicle_id: Uuid)
        -> TransitResult<Option<DriverSession>>;
    async fn clear_session(&self, vehicle_id: Uuid) -> TransitResult<()>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn append_location(&self, location: Location) -> TransitResult<()>;
}
