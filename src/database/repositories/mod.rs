pub mod location;
pub mod memory;
pub mod shift;

pub use location::{LocationDirectory, PgLocationRepository};
pub use memory::{InMemoryLocationDirectory, InMemoryShiftStore};
pub use shift::{PgShiftRepository, ShiftStore};
