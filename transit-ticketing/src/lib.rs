pub mod interval;
pub mod ledger;

pub use interval::SeatSegment;
pub use ledger::{CreateTicketBooking, SegmentBookingLedger};
