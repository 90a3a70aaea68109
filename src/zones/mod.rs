pub mod parser;

pub use parser::{FloodZones, parse_flood_zones};
