use std::sync::Arc;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::AppError;

use database::repositories::{LocationDirectory, ShiftStore};
use services::clock::Clock;
use services::shift_service::ShiftService;

pub struct AppState {
    pub shift_service: ShiftService,
    pub locations: Arc<dyn LocationDirectory>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        shifts: Arc<dyn ShiftStore>,
        locations: Arc<dyn LocationDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            shift_service: ShiftService::new(shifts, locations.clone()),
            locations,
            clock,
        }
    }
}
