pub mod coordinate;
pub mod flood_zone;
pub mod route;

pub use coordinate::{Coordinate, CoordinateError};
pub use flood_zone::FloodZone;
pub use route::Route;
