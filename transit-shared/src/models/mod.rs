pub mod booking;
pub mod place;
pub mod route;
pub mod schedule;
pub mod trip;
pub mod vehicle;
pub mod wallet;

pub use booking::{CheckPoint, Passenger, SeatBooking, TicketBooking};
pub use place::Place;
pub use route::{Route, RouteStop};
pub use schedule::VehicleSchedule;
pub use trip::{DriverSession, Location, Trip};
pub use vehicle::{SeatRef, SeatSelection, SeatSide, SeatStatus, Vehicle, VehicleSeat};
pub use wallet::{TransactionKind, TransactionStatus, WalletAccount, WalletTransaction};
