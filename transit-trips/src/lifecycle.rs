use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use transit_core::repository::{
    LocationRepository, RouteRepository, ScheduleRepository, SeatBookingRepository,
    SessionRepository, TicketBookingRepository, TripRepository, VehicleRepository,
};
use transit_core::{TransitError, TransitResult, TransitRules};
use transit_network::{GeofenceStopDetector, RouteTopology, StopMatch};
use transit_shared::geo::{haversine_km, round2, round4, GeoPoint};
use transit_shared::models::{
    CheckPoint, DriverSession, Location, Route, SeatBooking, SeatStatus, TicketBooking, Trip,
    VehicleSchedule,
};
use transit_store::{LeaseKey, LeaseMap};

/// Remark appended when the driver confirms ending away from the destination.
const OUT_OF_RANGE_REMARK: &str = "Driver ended the trip outside the expected destination.";

#[derive(Debug, Clone)]
pub struct StartTrip {
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    /// Present: confirmed-schedule start (mode a).
    pub schedule_id: Option<Uuid>,
    /// Without a schedule id, a position enables the implicit schedule match
    /// (mode b) before falling back to an ad-hoc trip (mode c).
    pub position: Option<GeoPoint>,
}

/// Outcome of a start request. `ConfirmScheduled` mutates nothing; the caller
/// re-invokes with the schedule id to actually start.
#[derive(Debug, Clone)]
pub enum TripStart {
    Started(Trip),
    ConfirmScheduled {
        schedule: VehicleSchedule,
        tickets: Vec<TicketBooking>,
    },
}

#[derive(Debug, Clone)]
pub struct EndTrip {
    pub trip_id: Uuid,
    pub driver_id: Uuid,
    pub position: GeoPoint,
    pub confirm_out_of_range: bool,
}

/// Outcome of an end request. `OutOfRange` mutates nothing; the caller may
/// re-invoke with `confirm_out_of_range` set.
#[derive(Debug, Clone)]
pub enum TripEnd {
    Ended {
        trip: Trip,
        within_destination: bool,
    },
    OutOfRange {
        distance_km: f64,
    },
}

/// What a live position means for a trip: the covered stop (if any) and who
/// is expected to board or alight there.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStopReport {
    pub stop: Option<StopMatch>,
    /// Scheduled trips: tickets whose pickup place is this stop.
    pub pending_pickups: Vec<TicketBooking>,
    /// Ad-hoc trips: open seat occupancies due to alight here.
    pub pending_dropoffs: Vec<SeatBooking>,
}

/// Trip state machine: NoTrip -> Active -> Ended. A vehicle holds at most one
/// active trip; all transitions run under the vehicle lease.
pub struct TripEngine {
    vehicles: Arc<dyn VehicleRepository>,
    routes: Arc<dyn RouteRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    tickets: Arc<dyn TicketBookingRepository>,
    trips: Arc<dyn TripRepository>,
    seat_bookings: Arc<dyn SeatBookingRepository>,
    sessions: Arc<dyn SessionRepository>,
    locations: Arc<dyn LocationRepository>,
    leases: Arc<LeaseMap>,
    detector: GeofenceStopDetector,
    rules: TransitRules,
}

impl TripEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vehicles: Arc<dyn VehicleRepository>,
        routes: Arc<dyn RouteRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        tickets: Arc<dyn TicketBookingRepository>,
        trips: Arc<dyn TripRepository>,
        seat_bookings: Arc<dyn SeatBookingRepository>,
        sessions: Arc<dyn SessionRepository>,
        locations: Arc<dyn LocationRepository>,
        leases: Arc<LeaseMap>,
        rules: TransitRules,
    ) -> Self {
        let detector = GeofenceStopDetector::new(rules.clone());
        Self {
            vehicles,
            routes,
            schedules,
            tickets,
            trips,
            seat_bookings,
            sessions,
            locations,
            leases,
            detector,
            rules,
        }
    }

    /// Bind a driver and route to a vehicle. Required before any trip start;
    /// the session is cleared again when a trip ends.
    pub async fn connect_vehicle(
        &self,
        vehicle_id: Uuid,
        driver_id: Uuid,
        route_id: Uuid,
    ) -> TransitResult<DriverSession> {
        let vehicle = self
            .vehicles
            .get_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("vehicle {}", vehicle_id)))?;

        if !vehicle.driver_ids.contains(&driver_id) {
            return Err(TransitError::Forbidden(
                "user is not a driver of this vehicle".into(),
            ));
        }
        if !vehicle.route_ids.contains(&route_id) {
            return Err(TransitError::Validation(
                "route is not assigned to this vehicle".into(),
            ));
        }
        if self.routes.get_route(route_id).await?.is_none() {
            return Err(TransitError::NotFound(format!("route {}", route_id)));
        }

        let session = DriverSession {
            vehicle_id,
            driver_id,
            route_id,
            started_at: Utc::now(),
        };
        self.sessions.put_session(session.clone()).await?;
        tracing::info!(vehicle = %vehicle_id, driver = %driver_id, route = %route_id, "driver connected");
        Ok(session)
    }

    pub async fn start_trip(&self, req: StartTrip) -> TransitResult<TripStart> {
        let _lease = self.leases.acquire(LeaseKey::Vehicle(req.vehicle_id)).await;

        let vehicle = self
            .vehicles
            .get_vehicle(req.vehicle_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("vehicle {}", req.vehicle_id)))?;

        let session = self
            .sessions
            .session_for_vehicle(vehicle.id)
            .await?
            .ok_or_else(|| {
                TransitError::Validation(
                    "vehicle has no connected driver/route; connect first".into(),
                )
            })?;
        if session.driver_id != req.driver_id {
            return Err(TransitError::Forbidden(
                "you are not the active driver of this vehicle".into(),
            ));
        }

        if self.trips.active_trip_for_vehicle(vehicle.id).await?.is_some() {
            return Err(TransitError::Conflict(
                "vehicle already has an active trip".into(),
            ));
        }

        if let Some(schedule_id) = req.schedule_id {
            return self
                .start_scheduled(&session, schedule_id, req.driver_id)
                .await;
        }

        if let Some(position) = req.position {
            if let Some(matched) = self.match_schedule(vehicle.id, position).await? {
                let tickets = self.tickets.list_for_schedule(matched.id).await?;
                tracing::info!(
                    vehicle = %vehicle.id,
                    schedule = %matched.id,
                    tickets = tickets.len(),
                    "implicit schedule match; confirmation required"
                );
                return Ok(TripStart::ConfirmScheduled {
                    schedule: matched,
                    tickets,
                });
            }
        }

        self.start_adhoc(&session, req.driver_id).await
    }

    /// Mode a: start a confirmed schedule and materialize its ticket bookings
    /// into per-seat occupancies.
    async fn start_scheduled(
        &self,
        session: &DriverSession,
        schedule_id: Uuid,
        driver_id: Uuid,
    ) -> TransitResult<TripStart> {
        let schedule = self
            .schedules
            .get_schedule(schedule_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("schedule {}", schedule_id)))?;
        if schedule.vehicle_id != session.vehicle_id {
            return Err(TransitError::Validation(
                "schedule does not belong to this vehicle".into(),
            ));
        }
        let today = Utc::now().date_naive();
        if schedule.date != today {
            return Err(TransitError::Validation(format!(
                "schedule is dated {}, not today",
                schedule.date
            )));
        }

        let route = self.resolve_route(schedule.route_id).await?;
        let now = Utc::now();
        let trip = Trip {
            id: Uuid::new_v4(),
            trip_id: generate_trip_ref(session.vehicle_id, now),
            vehicle_id: session.vehicle_id,
            driver_id,
            route_id: route.id,
            start_time: now,
            end_time: None,
            remarks: None,
            is_scheduled: true,
            schedule_id: Some(schedule.id),
        };

        // Resolve every ticketed seat before touching state so a bad ticket
        // aborts the whole start.
        let tickets = self.tickets.list_for_schedule(schedule.id).await?;
        let mut occupancies = Vec::new();
        for ticket in &tickets {
            let per_seat = round2(ticket.price / ticket.seats.len().max(1) as f64);
            for seat_ref in &ticket.seats {
                let seat = self
                    .vehicles
                    .find_seat(session.vehicle_id, *seat_ref)
                    .await?
                    .ok_or_else(|| {
                        TransitError::Validation(format!(
                            "ticket {} references seat {} missing from the vehicle",
                            ticket.pnr,
                            seat_ref.label()
                        ))
                    })?;
                occupancies.push(SeatBooking {
                    id: Uuid::new_v4(),
                    vehicle_id: session.vehicle_id,
                    seat_id: seat.id,
                    trip_id: Some(trip.id),
                    passenger: ticket.passenger,
                    check_in: CheckPoint {
                        position: route.start.position,
                        at: now,
                        address: route.start.name.clone(),
                    },
                    check_out: None,
                    trip_distance_km: None,
                    trip_duration_secs: None,
                    // Ticket price split evenly across its seats; settled at
                    // ticket sale, so the occupancy is already paid.
                    trip_amount: Some(per_seat),
                    is_paid: true,
                    created_at: now,
                });
            }
        }

        self.trips.insert_trip(trip.clone()).await?;
        for booking in occupancies {
            self.vehicles
                .set_seat_status(booking.seat_id, SeatStatus::Booked)
                .await?;
            self.seat_bookings.insert_seat_booking(booking).await?;
        }

        tracing::info!(
            trip = %trip.trip_id,
            schedule = %schedule.id,
            tickets = tickets.len(),
            "scheduled trip started"
        );
        Ok(TripStart::Started(trip))
    }

    /// Mode b: today's schedule whose departure time is within the configured
    /// window of now and whose route start covers the given position.
    async fn match_schedule(
        &self,
        vehicle_id: Uuid,
        position: GeoPoint,
    ) -> TransitResult<Option<VehicleSchedule>> {
        let now = Utc::now();
        let today = now.date_naive();
        for schedule in self.schedules.list_for_vehicle_on(vehicle_id, today).await? {
            let departure = schedule.date.and_time(schedule.time).and_utc();
            let minutes_off = (now - departure).num_minutes().abs();
            if minutes_off > self.rules.minute_coverage_schedule {
                continue;
            }
            let Some(route) = self.routes.get_route(schedule.route_id).await? else {
                continue;
            };
            let distance = haversine_km(position, route.start.position);
            if distance <= self.rules.point_cover_radius_km {
                return Ok(Some(schedule));
            }
        }
        Ok(None)
    }

    /// Mode c: plain ad-hoc trip on the session's route.
    async fn start_adhoc(
        &self,
        session: &DriverSession,
        driver_id: Uuid,
    ) -> TransitResult<TripStart> {
        let route = self.resolve_route(session.route_id).await?;
        let now = Utc::now();
        let trip = Trip {
            id: Uuid::new_v4(),
            trip_id: generate_trip_ref(session.vehicle_id, now),
            vehicle_id: session.vehicle_id,
            driver_id,
            route_id: route.id,
            start_time: now,
            end_time: None,
            remarks: None,
            is_scheduled: false,
            schedule_id: None,
        };
        self.trips.insert_trip(trip.clone()).await?;
        tracing::info!(trip = %trip.trip_id, vehicle = %session.vehicle_id, "ad-hoc trip started");
        Ok(TripStart::Started(trip))
    }

    pub async fn end_trip(&self, req: EndTrip) -> TransitResult<TripEnd> {
        let vehicle_id = self
            .trips
            .get_trip(req.trip_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("trip {}", req.trip_id)))?
            .vehicle_id;

        let _lease = self.leases.acquire(LeaseKey::Vehicle(vehicle_id)).await;

        // Re-read under the lease; a concurrent end may have committed while
        // this request waited.
        let mut trip = self
            .trips
            .get_trip(req.trip_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("trip {}", req.trip_id)))?;

        if trip.end_time.is_some() {
            return Err(TransitError::Conflict("trip is already ended".into()));
        }
        if trip.driver_id != req.driver_id {
            return Err(TransitError::Forbidden(
                "you are not the driver of this trip".into(),
            ));
        }

        let open = self.seat_bookings.open_bookings_for_trip(trip.id).await?;
        if !open.is_empty() {
            let mut seats = Vec::with_capacity(open.len());
            for booking in &open {
                let label = match self.vehicles.get_seat(booking.seat_id).await? {
                    Some(seat) => seat.label(),
                    None => booking.seat_id.to_string(),
                };
                seats.push(label);
            }
            seats.sort();
            return Err(TransitError::PendingCheckout { seats });
        }

        let route = self.resolve_route(trip.route_id).await?;
        // Compared unrounded; rounding first would let a position just past
        // the radius slip through as in-range.
        let distance_km = haversine_km(req.position, route.end.position);
        let within_destination = distance_km <= self.rules.destination_radius_km;
        if !within_destination {
            if !req.confirm_out_of_range {
                tracing::info!(
                    trip = %trip.trip_id,
                    distance_km,
                    "end requested away from destination; confirmation required"
                );
                return Ok(TripEnd::OutOfRange {
                    distance_km: round4(distance_km),
                });
            }
            trip.push_remark(OUT_OF_RANGE_REMARK);
        }

        trip.end_time = Some(Utc::now());
        self.trips.update_trip(trip.clone()).await?;
        self.locations
            .append_location(Location::new(
                trip.vehicle_id,
                Some(trip.id),
                req.position,
            ))
            .await?;
        // The vehicle must be reconnected before its next trip.
        self.sessions.clear_session(trip.vehicle_id).await?;

        tracing::info!(trip = %trip.trip_id, within_destination, "trip ended");
        Ok(TripEnd::Ended {
            trip,
            within_destination,
        })
    }

    /// Where a live position puts the trip: the covered stop plus the pickups
    /// (scheduled) or dropoffs (ad-hoc) expected there.
    pub async fn current_stop(
        &self,
        trip_id: Uuid,
        position: GeoPoint,
    ) -> TransitResult<CurrentStopReport> {
        let trip = self
            .trips
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("trip {}", trip_id)))?;
        let route = self.resolve_route(trip.route_id).await?;
        let topology = RouteTopology::new(&route)?;

        let Some(stop) = self.detector.detect(&topology, position) else {
            return Ok(CurrentStopReport {
                stop: None,
                pending_pickups: Vec::new(),
                pending_dropoffs: Vec::new(),
            });
        };

        let mut pending_pickups = Vec::new();
        let mut pending_dropoffs = Vec::new();
        if trip.is_scheduled {
            if let Some(schedule_id) = trip.schedule_id {
                pending_pickups = self
                    .tickets
                    .list_for_schedule(schedule_id)
                    .await?
                    .into_iter()
                    .filter(|t| t.pickup_place_id == Some(stop.place.id))
                    .collect();
            }
        } else if stop.place.id == route.end.id {
            // Ad-hoc passengers ride to the route end; everyone still checked
            // in is due to alight there.
            pending_dropoffs = self.seat_bookings.open_bookings_for_trip(trip.id).await?;
        }

        Ok(CurrentStopReport {
            stop: Some(stop),
            pending_pickups,
            pending_dropoffs,
        })
    }

    /// Append-only location ingestion. A trip reference that doesn't belong
    /// to the vehicle is dropped rather than rejected.
    pub async fn record_location(
        &self,
        vehicle_id: Uuid,
        trip_id: Option<Uuid>,
        position: GeoPoint,
        speed_kmh: Option<f64>,
        course: Option<f64>,
    ) -> TransitResult<Location> {
        if self.vehicles.get_vehicle(vehicle_id).await?.is_none() {
            return Err(TransitError::NotFound(format!("vehicle {}", vehicle_id)));
        }
        let trip_id = match trip_id {
            Some(id) => self
                .trips
                .get_trip(id)
                .await?
                .filter(|t| t.vehicle_id == vehicle_id)
                .map(|t| t.id),
            None => None,
        };
        let mut location = Location::new(vehicle_id, trip_id, position);
        location.speed_kmh = speed_kmh;
        location.course = course;
        self.locations.append_location(location.clone()).await?;
        Ok(location)
    }

    async fn resolve_route(&self, route_id: Uuid) -> TransitResult<Route> {
        self.routes
            .get_route(route_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("route {}", route_id)))
    }
}

/// Public trip reference: `T-<YYYYMMDD>-<vehicleId>-<8 hex chars>`.
fn generate_trip_ref(vehicle_id: Uuid, at: DateTime<Utc>) -> String {
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    format!("T-{}-{}-{}", at.format("%Y%m%d"), vehicle_id, suffix)
}
