pub mod location;
pub mod shift;

pub use location::*;
pub use shift::*;
