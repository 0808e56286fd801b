pub mod locations;
pub mod shared;
pub mod shifts;
