pub mod boarding;
pub mod lifecycle;

pub use boarding::{AdHocSeatBookingEngine, CheckIn, Checkout};
pub use lifecycle::{CurrentStopReport, EndTrip, StartTrip, TripEngine, TripEnd, TripStart};
