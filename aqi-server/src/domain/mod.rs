//! Domain types for the AQI service.
//!
//! Coordinates, the great-circle distance between them, and the station
//! values produced by nearest-station matching.

mod coordinate;
mod station;

pub use coordinate::{Coordinate, EARTH_RADIUS_KM, distance_km};
pub use station::{CPCB_SOURCE, NearestStationResult, Station, StationRef, UNKNOWN_STATION_NAME};
