pub mod length;

pub use length::{KM_PER_DEGREE, degrees_to_km, planar_length};
