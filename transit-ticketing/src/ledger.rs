use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use transit_core::repository::{
    RouteRepository, ScheduleRepository, TicketBookingRepository, VehicleRepository,
};
use transit_core::{TransitError, TransitResult, TransitRules};
use transit_network::RouteTopology;
use transit_shared::geo::round2;
use transit_shared::models::{Passenger, SeatRef, TicketBooking};
use transit_store::{LeaseKey, LeaseMap};

use crate::interval::SeatSegment;

const TICKET_ID_LEN: usize = 8;
const TICKET_ID_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone)]
pub struct CreateTicketBooking {
    pub schedule_id: Uuid,
    pub seats: Vec<SeatRef>,
    pub pickup_place_id: Option<Uuid>,
    pub destination_place_id: Option<Uuid>,
    pub passenger: Passenger,
    pub name: String,
    pub phone: String,
    pub is_paid: bool,
}

/// Allocates seats to pre-sold tickets on a schedule using segment-interval
/// overlap, and issues ticket ids/PNRs. All check-then-act runs under the
/// schedule lease so the no-oversell invariant holds under concurrent load.
pub struct SegmentBookingLedger {
    schedules: Arc<dyn ScheduleRepository>,
    routes: Arc<dyn RouteRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    tickets: Arc<dyn TicketBookingRepository>,
    leases: Arc<LeaseMap>,
    rules: TransitRules,
}

impl SegmentBookingLedger {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        routes: Arc<dyn RouteRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        tickets: Arc<dyn TicketBookingRepository>,
        leases: Arc<LeaseMap>,
        rules: TransitRules,
    ) -> Self {
        Self {
            schedules,
            routes,
            vehicles,
            tickets,
            leases,
            rules,
        }
    }

    pub async fn create_ticket_booking(
        &self,
        req: CreateTicketBooking,
    ) -> TransitResult<TicketBooking> {
        if req.seats.is_empty() {
            return Err(TransitError::Validation("at least one seat is required".into()));
        }
        if req.name.trim().is_empty() || req.phone.trim().is_empty() {
            return Err(TransitError::Validation("name and phone are required".into()));
        }
        for (i, seat) in req.seats.iter().enumerate() {
            if req.seats[..i].contains(seat) {
                return Err(TransitError::Validation(format!(
                    "seat {} requested more than once",
                    seat.label()
                )));
            }
        }

        let _lease = self
            .leases
            .acquire(LeaseKey::Schedule(req.schedule_id))
            .await;

        let schedule = self
            .schedules
            .get_schedule(req.schedule_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("schedule {}", req.schedule_id)))?;
        let route = self
            .routes
            .get_route(schedule.route_id)
            .await?
            .ok_or_else(|| TransitError::NotFound(format!("route {}", schedule.route_id)))?;
        let topology = RouteTopology::new(&route)?;

        for seat in &req.seats {
            if self
                .vehicles
                .find_seat(schedule.vehicle_id, *seat)
                .await?
                .is_none()
            {
                return Err(TransitError::Validation(format!(
                    "seat {} does not exist on the scheduled vehicle",
                    seat.label()
                )));
            }
        }

        let segment = SeatSegment::for_request(
            &topology,
            req.pickup_place_id,
            req.destination_place_id,
        )?;

        for existing in self.tickets.list_for_schedule(schedule.id).await? {
            let other = SeatSegment::for_stored(
                &topology,
                existing.pickup_place_id,
                existing.destination_place_id,
            );
            if !segment.overlaps(&other) {
                continue;
            }
            if let Some(taken) = req.seats.iter().find(|s| existing.seats.contains(s)) {
                tracing::info!(
                    schedule = %schedule.id,
                    seat = %taken.label(),
                    segment = %other,
                    pnr = %existing.pnr,
                    "rejecting ticket booking: seat already reserved"
                );
                return Err(TransitError::Conflict(format!(
                    "seat {} is already reserved for segment {}",
                    taken.label(),
                    other
                )));
            }
        }

        let ticket_id = self.generate_ticket_id().await?;
        let pnr = format!("{}{}", self.rules.pnr_prefix, ticket_id);
        let price = round2(schedule.price * req.seats.len() as f64);

        let booking = TicketBooking {
            id: Uuid::new_v4(),
            schedule_id: schedule.id,
            passenger: req.passenger,
            name: req.name,
            phone: req.phone,
            ticket_id,
            pnr,
            seats: req.seats,
            pickup_place_id: req.pickup_place_id,
            destination_place_id: req.destination_place_id,
            price,
            is_paid: req.is_paid,
            created_at: Utc::now(),
        };

        self.tickets.insert_ticket_booking(booking.clone()).await?;
        tracing::info!(
            schedule = %schedule.id,
            pnr = %booking.pnr,
            seats = booking.seats.len(),
            segment = %segment,
            price,
            "ticket booking created"
        );
        Ok(booking)
    }

    /// Random ticket id, regenerated on the (unlikely) collision.
    async fn generate_ticket_id(&self) -> TransitResult<String> {
        loop {
            let id: String = {
                let mut rng = rand::thread_rng();
                (0..TICKET_ID_LEN)
                    .map(|_| {
                        let idx = rng.gen_range(0..TICKET_ID_CHARSET.len());
                        TICKET_ID_CHARSET[idx] as char
                    })
                    .collect()
            };
            if !self.tickets.ticket_id_exists(&id).await? {
                return Ok(id);
            }
        }
    }
}
