//! Monitoring station types.

use serde::Serialize;

use super::Coordinate;

/// Placeholder used when a feed record carries no usable name.
pub const UNKNOWN_STATION_NAME: &str = "NA";

/// Source tag attached to every nearest-station result.
pub const CPCB_SOURCE: &str = "CPCB";

/// A monitoring station resolved from the feed.
///
/// Only constructed for records whose coordinates parsed to finite numbers,
/// so code receiving a `Station` can trust its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Display name used to search the AQICN map.
    pub name: String,

    /// Station location.
    pub location: Coordinate,

    /// AQI reported by the feed, if present. Informational only.
    pub feed_aqi: Option<f64>,

    /// Distance from the query point, in kilometres.
    pub distance_km: f64,
}

/// The station part of the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationRef {
    pub name: String,
}

/// Nearest-station answer as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearestStationResult {
    pub station: StationRef,
    pub source: &'static str,
}

impl From<&Station> for NearestStationResult {
    fn from(station: &Station) -> Self {
        Self {
            station: StationRef {
                name: station.name.clone(),
            },
            source: CPCB_SOURCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_from_station() {
        let station = Station {
            name: "Anand Vihar, Delhi - DPCC".to_string(),
            location: Coordinate::new(28.6468, 77.3160),
            feed_aqi: Some(312.0),
            distance_km: 4.2,
        };

        let result = NearestStationResult::from(&station);
        assert_eq!(result.station.name, "Anand Vihar, Delhi - DPCC");
        assert_eq!(result.source, "CPCB");
    }

    #[test]
    fn serializes_to_nested_shape() {
        let result = NearestStationResult {
            station: StationRef {
                name: "Bandra".to_string(),
            },
            source: CPCB_SOURCE,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"station": {"name": "Bandra"}, "source": "CPCB"})
        );
    }
}
