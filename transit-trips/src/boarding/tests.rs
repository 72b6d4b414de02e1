use super::*;
use async_trait::async_trait;
use chrono::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use transit_shared::models::{SeatSide, Trip, Vehicle, VehicleSeat, WalletTransaction};
use transit_store::{MemStore, MemWalletLedger};

struct Fixture {
    engine: AdHocSeatBookingEngine,
    store: Arc<MemStore>,
    wallet: Arc<MemWalletLedger>,
    vehicle_id: Uuid,
    driver_id: Uuid,
    seat_a1: Uuid,
    seat_a2: Uuid,
}

fn rules() -> TransitRules {
    TransitRules {
        per_km_charge: 50.0,
        ..TransitRules::default()
    }
}

async fn fixture_with_wallet(wallet: Arc<dyn WalletLedger>) -> (AdHocSeatBookingEngine, Arc<MemStore>, Uuid, Uuid, Uuid) {
    let store = Arc::new(MemStore::new());
    let vehicle = Vehicle::new("Sajha 1", "BA-2-1234");
    let vehicle_id = vehicle.id;
    store.add_vehicle(vehicle).await;
    let a1 = VehicleSeat::new(vehicle_id, SeatSide::A, 1);
    let a2 = VehicleSeat::new(vehicle_id, SeatSide::A, 2);
    let (seat_a1, seat_a2) = (a1.id, a2.id);
    store.add_seat(a1).await.unwrap();
    store.add_seat(a2).await.unwrap();

    let engine = AdHocSeatBookingEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        wallet,
        Arc::new(LeaseMap::new()),
        rules(),
    );
    (engine, store, vehicle_id, seat_a1, seat_a2)
}

async fn fixture() -> Fixture {
    let wallet = Arc::new(MemWalletLedger::new());
    let (engine, store, vehicle_id, seat_a1, seat_a2) =
        fixture_with_wallet(wallet.clone()).await;
    Fixture {
        engine,
        store,
        wallet,
        vehicle_id,
        driver_id: Uuid::new_v4(),
        seat_a1,
        seat_a2,
    }
}

async fn active_trip(fx: &Fixture, is_scheduled: bool) -> Trip {
    let trip = Trip {
        id: Uuid::new_v4(),
        trip_id: "T-20260825-veh-deadbeef".to_string(),
        vehicle_id: fx.vehicle_id,
        driver_id: fx.driver_id,
        route_id: Uuid::new_v4(),
        start_time: Utc::now(),
        end_time: None,
        remarks: None,
        is_scheduled,
        schedule_id: is_scheduled.then(Uuid::new_v4),
    };
    fx.store.insert_trip(trip.clone()).await.unwrap();
    trip
}

fn check_in_req(fx: &Fixture, seat_id: Uuid, passenger: Passenger) -> CheckIn {
    CheckIn {
        vehicle_id: fx.vehicle_id,
        seat_id,
        passenger,
        position: GeoPoint::new(27.70, 85.30),
        at: Utc::now() - Duration::seconds(600),
        address: "Ratnapark".to_string(),
    }
}

fn checkout_req(seat_id: Uuid) -> Checkout {
    Checkout {
        seat_id,
        position: GeoPoint::new(27.71, 85.31),
        address: "Koteshwor".to_string(),
        is_paid: false,
    }
}

#[tokio::test]
async fn test_check_in_books_seat_and_attaches_trip() {
    let fx = fixture().await;
    let trip = active_trip(&fx, false).await;

    let booking = fx
        .engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap();
    assert_eq!(booking.trip_id, Some(trip.id));
    assert!(booking.is_open());
    assert!(!booking.is_paid);

    let seat = fx.store.get_seat(fx.seat_a1).await.unwrap().unwrap();
    assert_eq!(seat.status, SeatStatus::Booked);

    // Same seat again while occupied.
    let err = fx
        .engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap_err();
    assert!(matches!(err, TransitError::Conflict(_)));
}

#[tokio::test]
async fn test_check_in_without_trip_leaves_booking_unattached() {
    let fx = fixture().await;
    let booking = fx
        .engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap();
    assert!(booking.trip_id.is_none());
}

#[tokio::test]
async fn test_check_in_rejects_foreign_seat() {
    let fx = fixture().await;
    let other = Vehicle::new("Sajha 2", "BA-2-5678");
    let other_id = other.id;
    fx.store.add_vehicle(other).await;
    let foreign = VehicleSeat::new(other_id, SeatSide::A, 1);
    let foreign_id = foreign.id;
    fx.store.add_seat(foreign).await.unwrap();

    let err = fx
        .engine
        .check_in(check_in_req(&fx, foreign_id, Passenger::Guest))
        .await
        .unwrap_err();
    assert!(matches!(err, TransitError::Validation(_)));

    let mut req = check_in_req(&fx, fx.seat_a1, Passenger::Guest);
    req.vehicle_id = Uuid::new_v4();
    let err = fx.engine.check_in(req).await.unwrap_err();
    assert!(matches!(err, TransitError::NotFound(_)));
}

#[tokio::test]
async fn test_switch_seat_moves_booking_and_statuses() {
    let fx = fixture().await;
    active_trip(&fx, false).await;
    let booking = fx
        .engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap();

    let moved = fx.engine.switch_seat(fx.seat_a1, fx.seat_a2).await.unwrap();
    assert_eq!(moved.id, booking.id);
    assert_eq!(moved.seat_id, fx.seat_a2);

    let a1 = fx.store.get_seat(fx.seat_a1).await.unwrap().unwrap();
    let a2 = fx.store.get_seat(fx.seat_a2).await.unwrap().unwrap();
    assert_eq!(a1.status, SeatStatus::Available);
    assert_eq!(a2.status, SeatStatus::Booked);
}

#[tokio::test]
async fn test_switch_rejects_occupied_target_and_missing_booking() {
    let fx = fixture().await;
    fx.engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap();
    fx.engine
        .check_in(check_in_req(&fx, fx.seat_a2, Passenger::Guest))
        .await
        .unwrap();

    let err = fx.engine.switch_seat(fx.seat_a1, fx.seat_a2).await.unwrap_err();
    assert!(matches!(err, TransitError::Conflict(_)));

    // Close A1, then there is no open booking left to move.
    fx.engine.checkout(checkout_req(fx.seat_a1)).await.unwrap();
    let err = fx.engine.switch_seat(fx.seat_a1, fx.seat_a1).await.unwrap_err();
    assert!(matches!(err, TransitError::NotFound(_)));
}

#[tokio::test]
async fn test_checkout_computes_distance_duration_and_fare() {
    let fx = fixture().await;
    active_trip(&fx, false).await;
    let user_id = Uuid::new_v4();
    fx.engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Registered { user_id }))
        .await
        .unwrap();

    let booking = fx.engine.checkout(checkout_req(fx.seat_a1)).await.unwrap();
    assert!(!booking.is_open());
    // ~1.485 km at 50/km; distance stored rounded, fare rounded once.
    assert_eq!(booking.trip_distance_km, Some(1.49));
    assert_eq!(booking.trip_amount, Some(74.26));
    let duration = booking.trip_duration_secs.unwrap();
    assert!((599..=610).contains(&duration), "duration: {}", duration);

    let seat = fx.store.get_seat(fx.seat_a1).await.unwrap().unwrap();
    assert_eq!(seat.status, SeatStatus::Available);

    // Passenger owes the fare, driver is owed it.
    let pax = fx.wallet.account(user_id).await.unwrap();
    assert_eq!(pax.to_pay, 74.26);
    let drv = fx.wallet.account(fx.driver_id).await.unwrap();
    assert_eq!(drv.to_receive, 74.26);

    let memos: Vec<String> = fx
        .wallet
        .transactions_for(user_id)
        .await
        .into_iter()
        .map(|t| t.remarks)
        .collect();
    assert_eq!(
        memos,
        vec![format!("Trip amount - seat booking {}", booking.id)]
    );
}

#[tokio::test]
async fn test_checkout_keeps_preset_fare_on_scheduled_trip() {
    let fx = fixture().await;
    active_trip(&fx, true).await;
    let user_id = Uuid::new_v4();
    let mut booking = fx
        .engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Registered { user_id }))
        .await
        .unwrap();
    booking.trip_amount = Some(100.0);
    fx.store.update_seat_booking(booking).await.unwrap();

    let closed = fx.engine.checkout(checkout_req(fx.seat_a1)).await.unwrap();
    assert_eq!(closed.trip_amount, Some(100.0));
    assert_eq!(closed.trip_distance_km, Some(1.49));

    // Scheduled fares never credit the driver.
    assert!(fx.wallet.account(fx.driver_id).await.is_none());
    let pax = fx.wallet.account(user_id).await.unwrap();
    assert_eq!(pax.to_pay, 100.0);
}

#[tokio::test]
async fn test_checkout_recomputes_zero_preset_on_scheduled_trip() {
    let fx = fixture().await;
    active_trip(&fx, true).await;
    let mut booking = fx
        .engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap();
    booking.trip_amount = Some(0.0);
    fx.store.update_seat_booking(booking).await.unwrap();

    let closed = fx.engine.checkout(checkout_req(fx.seat_a1)).await.unwrap();
    assert_eq!(closed.trip_amount, Some(74.26));
}

#[tokio::test]
async fn test_guest_checkout_credits_driver_only() {
    let fx = fixture().await;
    active_trip(&fx, false).await;
    fx.engine
        .check_in(check_in_req(&fx, fx.seat_a1, Passenger::Guest))
        .await
        .unwrap();

    fx.engine.checkout(checkout_req(fx.seat_a1)).await.unwrap();
    let drv = fx.wallet.account(fx.driver_id).await.unwrap();
    assert_eq!(drv.to_receive, 74.26);
    assert_eq!(fx.wallet.transactions_for(fx.driver_id).await.len(), 1);
}

#[tokio::test]
async fn test_checkout_without_open_booking_is_not_found() {
    let fx = fixture().await;
    let err = fx.engine.checkout(checkout_req(fx.seat_a1)).await.unwrap_err();
    assert!(matches!(err, TransitError::NotFound(_)));
}

struct FailingLedger;

#[async_trait]
impl WalletLedger for FailingLedger {
    async fn credit_settlement(
        &self,
        _settlement: Settlement,
    ) -> TransitResult<Vec<WalletTransaction>> {
        Err(TransitError::Upstream("wallet service unavailable".into()))
    }
}

/// Fails the first settlement, then behaves like the real ledger.
struct FlakyLedger {
    inner: Arc<MemWalletLedger>,
    tripped: AtomicBool,
}

#[async_trait]
impl WalletLedger for FlakyLedger {
    async fn credit_settlement(
        &self,
        settlement: Settlement,
    ) -> TransitResult<Vec<WalletTransaction>> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(TransitError::Upstream("wallet service unavailable".into()));
        }
        self.inner.credit_settlement(settlement).await
    }
}

#[tokio::test]
async fn test_ledger_failure_leaves_booking_open() {
    let (engine, store, vehicle_id, seat_a1, _) =
        fixture_with_wallet(Arc::new(FailingLedger)).await;

    let user_id = Uuid::new_v4();
    engine
        .check_in(CheckIn {
            vehicle_id,
            seat_id: seat_a1,
            passenger: Passenger::Registered { user_id },
            position: GeoPoint::new(27.70, 85.30),
            at: Utc::now() - Duration::seconds(60),
            address: "Ratnapark".to_string(),
        })
        .await
        .unwrap();

    let err = engine.checkout(checkout_req(seat_a1)).await.unwrap_err();
    assert!(matches!(err, TransitError::Upstream(_)));

    // No domain change happened.
    let open = store.open_booking_for_seat(seat_a1).await.unwrap();
    assert!(open.is_some());
    let seat = store.get_seat(seat_a1).await.unwrap().unwrap();
    assert_eq!(seat.status, SeatStatus::Booked);
}

#[tokio::test]
async fn test_settlement_failure_retry_does_not_double_credit() {
    let wallet = Arc::new(MemWalletLedger::new());
    let flaky = Arc::new(FlakyLedger {
        inner: wallet.clone(),
        tripped: AtomicBool::new(false),
    });
    let (engine, store, vehicle_id, seat_a1, _) = fixture_with_wallet(flaky).await;

    let driver_id = Uuid::new_v4();
    store
        .insert_trip(Trip {
            id: Uuid::new_v4(),
            trip_id: "T-20260825-veh-deadbeef".to_string(),
            vehicle_id,
            driver_id,
            route_id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: None,
            remarks: None,
            is_scheduled: false,
            schedule_id: None,
        })
        .await
        .unwrap();

    let user_id = Uuid::new_v4();
    engine
        .check_in(CheckIn {
            vehicle_id,
            seat_id: seat_a1,
            passenger: Passenger::Registered { user_id },
            position: GeoPoint::new(27.70, 85.30),
            at: Utc::now() - Duration::seconds(600),
            address: "Ratnapark".to_string(),
        })
        .await
        .unwrap();

    let err = engine.checkout(checkout_req(seat_a1)).await.unwrap_err();
    assert!(matches!(err, TransitError::Upstream(_)));
    // The failed attempt credited neither side.
    assert!(wallet.account(user_id).await.is_none());
    assert!(wallet.account(driver_id).await.is_none());

    // The retry settles exactly once.
    engine.checkout(checkout_req(seat_a1)).await.unwrap();
    assert_eq!(wallet.account(user_id).await.unwrap().to_pay, 74.26);
    assert_eq!(wallet.account(driver_id).await.unwrap().to_receive, 74.26);
    assert_eq!(wallet.transactions_for(user_id).await.len(), 1);
    assert_eq!(wallet.transactions_for(driver_id).await.len(), 1);
}
