use std::sync::Arc;

use transit_core::TransitRules;
use transit_store::{LeaseMap, MemStore, MemWalletLedger};
use transit_ticketing::SegmentBookingLedger;
use transit_trips::{AdHocSeatBookingEngine, TripEngine};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemStore>,
    pub wallet: Arc<MemWalletLedger>,
    pub ticketing: Arc<SegmentBookingLedger>,
    pub trips: Arc<TripEngine>,
    pub boarding: Arc<AdHocSeatBookingEngine>,
}

impl AppState {
    /// Wire every engine over one store and one lease map so vehicle and
    /// schedule leases are shared across the whole surface.
    pub fn new(store: Arc<MemStore>, rules: TransitRules) -> Self {
        let wallet = Arc::new(MemWalletLedger::new());
        let leases = Arc::new(LeaseMap::new());

        let ticketing = Arc::new(SegmentBookingLedger::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            leases.clone(),
            rules.clone(),
        ));
        let trips = Arc::new(TripEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            leases.clone(),
            rules.clone(),
        ));
        let boarding = Arc::new(AdHocSeatBookingEngine::new(
            store.clone(),
            store.clone(),
            store.clone(),
            wallet.clone(),
            leases,
            rules,
        ));

        Self {
            store,
            wallet,
            ticketing,
            trips,
            boarding,
        }
    }
}
