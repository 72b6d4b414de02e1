use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use transit_core::repository::{
    LocationRepository, RouteRepository, ScheduleRepository, SeatBookingRepository,
    SessionRepository, TicketBookingRepository, TripRepository, VehicleRepository,
};
use transit_core::{TransitError, TransitResult};
use transit_shared::models::{
    DriverSession, Location, Route, SeatBooking, SeatRef, SeatStatus, TicketBooking, Trip, Vehicle,
    VehicleSchedule, VehicleSeat,
};

/// In-memory backing store implementing every repository trait. Collections
/// sit behind their own RwLock; cross-collection check-then-act sequences are
/// serialized by the engines through the lease map, not here.
#[derive(Default)]
pub struct MemStore {
    routes: RwLock<HashMap<Uuid, Route>>,
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    seats: RwLock<HashMap<Uuid, VehicleSeat>>,
    schedules: RwLock<HashMap<Uuid, VehicleSchedule>>,
    ticket_bookings: RwLock<HashMap<Uuid, TicketBooking>>,
    trips: RwLock<HashMap<Uuid, Trip>>,
    seat_bookings: RwLock<HashMap<Uuid, SeatBooking>>,
    sessions: RwLock<HashMap<Uuid, DriverSession>>,
    locations: RwLock<Vec<Location>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_route(&self, route: Route) {
        self.routes.write().await.insert(route.id, route);
    }

    pub async fn add_vehicle(&self, vehicle: Vehicle) {
        self.vehicles.write().await.insert(vehicle.id, vehicle);
    }

    /// Register a seat, enforcing (vehicle, side, number) uniqueness.
    pub async fn add_seat(&self, seat: VehicleSeat) -> TransitResult<()> {
        let mut seats = self.seats.write().await;
        let duplicate = seats.values().any(|s| {
            s.vehicle_id == seat.vehicle_id && s.side == seat.side && s.number == seat.number
        });
        if duplicate {
            return Err(TransitError::Conflict(format!(
                "seat {} already exists on vehicle {}",
                seat.label(),
                seat.vehicle_id
            )));
        }
        seats.insert(seat.id, seat);
        Ok(())
    }

    pub async fn add_schedule(&self, schedule: VehicleSchedule) {
        self.schedules.write().await.insert(schedule.id, schedule);
    }

    pub async fn get_seat_booking(&self, id: Uuid) -> Option<SeatBooking> {
        self.seat_bookings.read().await.get(&id).cloned()
    }

    pub async fn list_locations_for_trip(&self, trip_id: Uuid) -> Vec<Location> {
        self.locations
            .read()
            .await
            .iter()
            .filter(|l| l.trip_id == Some(trip_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RouteRepository for MemStore {
    async fn get_route(&self, id: Uuid) -> TransitResult<Option<Route>> {
        Ok(self.routes.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl VehicleRepository for MemStore {
    async fn get_vehicle(&self, id: Uuid) -> TransitResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }

    async fn get_seat(&self, seat_id: Uuid) -> TransitResult<Option<VehicleSeat>> {
        Ok(self.seats.read().await.get(&seat_id).cloned())
    }

    async fn find_seat(
        &self,
        vehicle_id: Uuid,
        seat: SeatRef,
    ) -> TransitResult<Option<VehicleSeat>> {
        Ok(self
            .seats
            .read()
            .await
            .values()
            .find(|s| s.vehicle_id == vehicle_id && s.side == seat.side && s.number == seat.number)
            .cloned())
    }

    async fn list_seats(&self, vehicle_id: Uuid) -> TransitResult<Vec<VehicleSeat>> {
        let mut seats: Vec<VehicleSeat> = self
            .seats
            .read()
            .await
            .values()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        seats.sort_by_key(|s| (s.side, s.number));
        Ok(seats)
    }

    async fn set_seat_status(&self, seat_id: Uuid, status: SeatStatus) -> TransitResult<()> {
        let mut seats = self.seats.write().await;
        let seat = seats
            .get_mut(&seat_id)
            .ok_or_else(|| TransitError::NotFound(format!("seat {}", seat_id)))?;
        seat.status = status;
        Ok(())
    }
}

#[async_trait]
impl ScheduleRepository for MemStore {
    async fn get_schedule(&self, id: Uuid) -> TransitResult<Option<VehicleSchedule>> {
        Ok(self.schedules.read().await.get(&id).cloned())
    }

    async fn list_for_vehicle_on(
        &self,
        vehicle_id: Uuid,
        date: NaiveDate,
    ) -> TransitResult<Vec<VehicleSchedule>> {
        let mut found: Vec<VehicleSchedule> = self
            .schedules
            .read()
            .await
            .values()
            .filter(|s| s.vehicle_id == vehicle_id && s.date == date)
            .cloned()
            .collect();
        found.sort_by_key(|s| s.time);
        Ok(found)
    }
}

#[async_trait]
impl TicketBookingRepository for MemStore {
    async fn insert_ticket_booking(&self, booking: TicketBooking) -> TransitResult<()> {
        self.ticket_bookings
            .write()
            .await
            .insert(booking.id, booking);
        Ok(())
    }

    async fn list_for_schedule(&self, schedule_id: Uuid) -> TransitResult<Vec<TicketBooking>> {
        let mut found: Vec<TicketBooking> = self
            .ticket_bookings
            .read()
            .await
            .values()
            .filter(|b| b.schedule_id == schedule_id)
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }

    async fn ticket_id_exists(&self, ticket_id: &str) -> TransitResult<bool> {
        Ok(self
            .ticket_bookings
            .read()
            .await
            .values()
            .any(|b| b.ticket_id == ticket_id))
    }
}

#[async_trait]
impl TripRepository for MemStore {
    async fn insert_trip(&self, trip: Trip) -> TransitResult<()> {
        self.trips.write().await.insert(trip.id, trip);
        Ok(())
    }

    async fn get_trip(&self, id: Uuid) -> TransitResult<Option<Trip>> {
        Ok(self.trips.read().await.get(&id).cloned())
    }

    async fn update_trip(&self, trip: Trip) -> TransitResult<()> {
        let mut trips = self.trips.write().await;
        if !trips.contains_key(&trip.id) {
            return Err(TransitError::NotFound(format!("trip {}", trip.id)));
        }
        trips.insert(trip.id, trip);
        Ok(())
    }

    async fn active_trip_for_vehicle(&self, vehicle_id: Uuid) -> TransitResult<Option<Trip>> {
        Ok(self
            .trips
            .read()
            .await
            .values()
            .filter(|t| t.vehicle_id == vehicle_id && t.is_active())
            .max_by_key(|t| t.start_time)
            .cloned())
    }
}

#[async_trait]
impl SeatBookingRepository for MemStore {
    async fn insert_seat_booking(&self, booking: SeatBooking) -> TransitResult<()> {
        self.seat_bookings.write().await.insert(booking.id, booking);
        Ok(())
    }

    async fn update_seat_booking(&self, booking: SeatBooking) -> TransitResult<()> {
        let mut bookings = self.seat_bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(TransitError::NotFound(format!(
                "seat booking {}",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn open_booking_for_seat(&self, seat_id: Uuid) -> TransitResult<Option<SeatBooking>> {
        Ok(self
            .seat_bookings
            .read()
            .await
            .values()
            .filter(|b| b.seat_id == seat_id && b.is_open())
            .max_by_key(|b| b.created_at)
            .cloned())
    }

    async fn open_bookings_for_trip(&self, trip_id: Uuid) -> TransitResult<Vec<SeatBooking>> {
        let mut found: Vec<SeatBooking> = self
            .seat_bookings
            .read()
            .await
            .values()
            .filter(|b| b.trip_id == Some(trip_id) && b.is_open())
            .cloned()
            .collect();
        found.sort_by_key(|b| b.created_at);
        Ok(found)
    }
}

#[async_trait]
impl SessionRepository for MemStore {
    async fn put_session(&self, session: DriverSession) -> TransitResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.vehicle_id, session);
        Ok(())
    }

    async fn session_for_vehicle(
        &self,
        vehicle_id: Uuid,
    ) -> TransitResult<Option<DriverSession>> {
        Ok(self.sessions.read().await.get(&vehicle_id).cloned())
    }

    async fn clear_session(&self, vehicle_id: Uuid) -> TransitResult<()> {
        self.sessions.write().await.remove(&vehicle_id);
        Ok(())
    }
}

#[async_trait]
impl LocationRepository for MemStore {
    async fn append_location(&self, location: Location) -> TransitResult<()> {
        self.locations.write().await.push(location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_shared::models::SeatSide;

    #[tokio::test]
    async fn test_seat_uniqueness_enforced() {
        let store = MemStore::new();
        let vehicle = Vehicle::new("Sajha 1", "BA-2-1234");
        let vehicle_id = vehicle.id;
        store.add_vehicle(vehicle).await;

        store
            .add_seat(VehicleSeat::new(vehicle_id, SeatSide::A, 1))
            .await
            .unwrap();
        let err = store
            .add_seat(VehicleSeat::new(vehicle_id, SeatSide::A, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, TransitError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_seat_by_ref() {
        let store = MemStore::new();
        let vehicle = Vehicle::new("Sajha 1", "BA-2-1234");
        let vehicle_id = vehicle.id;
        store.add_vehicle(vehicle).await;
        let seat = VehicleSeat::new(vehicle_id, SeatSide::B, 3);
        let seat_id = seat.id;
        store.add_seat(seat).await.unwrap();

        let found = store
            .find_seat(vehicle_id, SeatRef::new(SeatSide::B, 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, seat_id);

        assert!(store
            .find_seat(vehicle_id, SeatRef::new(SeatSide::B, 4))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_open_booking_picks_latest() {
        use chrono::{Duration, Utc};
        use transit_shared::geo::GeoPoint;
        use transit_shared::models::{CheckPoint, Passenger};

        let store = MemStore::new();
        let seat_id = Uuid::new_v4();
        let make = |offset_secs: i64, open: bool| SeatBooking {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            seat_id,
            trip_id: None,
            passenger: Passenger::Guest,
            check_in: CheckPoint {
                position: GeoPoint::new(27.7, 85.3),
                at: Utc::now(),
                address: String::new(),
            },
            check_out: if open {
                None
            } else {
                Some(CheckPoint {
                    position: GeoPoint::new(27.7, 85.3),
                    at: Utc::now(),
                    address: String::new(),
                })
            },
            trip_distance_km: None,
            trip_duration_secs: None,
            trip_amount: None,
            is_paid: false,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        };

        store.insert_seat_booking(make(0, false)).await.unwrap();
        let older_open = make(1, true);
        let newer_open = make(2, true);
        let newest_id = newer_open.id;
        store.insert_seat_booking(older_open).await.unwrap();
        store.insert_seat_booking(newer_open).await.unwrap();

        let open = store.open_booking_for_seat(seat_id).await.unwrap().unwrap();
        assert_eq!(open.id, newest_id);
    }
}
