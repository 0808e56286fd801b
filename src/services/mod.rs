pub mod auth;
pub mod clock;
pub mod shift_clock;
pub mod shift_service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use shift_service::ShiftService;
