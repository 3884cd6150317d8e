//! Nearest-station matching over the CPCB feed.

use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::{Coordinate, Station, UNKNOWN_STATION_NAME, distance_km};

use super::number::parse_finite_number;
use super::types::{CpcbFeed, RawStationRecord};

/// Find the station closest to `user`.
///
/// Scans the feed lazily in traversal order. Records without parseable
/// coordinates are skipped, as is any record whose distance does not come
/// out finite. Ties keep the earliest record seen.
///
/// Returns `None` if the feed holds no station with valid coordinates.
pub fn nearest_station(feed: &CpcbFeed, user: Coordinate) -> Option<Station> {
    let mut best: Option<Station> = None;
    let mut scanned = 0usize;

    for record in feed.stations() {
        scanned += 1;
        let Some(candidate) = evaluate(record, user) else {
            continue;
        };

        let closer = best
            .as_ref()
            .is_none_or(|current| candidate.distance_km < current.distance_km);
        if closer {
            best = Some(candidate);
        }
    }

    debug!(
        scanned,
        found = best.is_some(),
        "scanned CPCB feed for nearest station"
    );
    best
}

/// Turn one record into a candidate, or `None` to skip it.
fn evaluate(record: &RawStationRecord, user: Coordinate) -> Option<Station> {
    let latitude = parse_finite_number(record.latitude.as_ref())?;
    let longitude = parse_finite_number(record.longitude.as_ref())?;
    let feed_aqi = parse_finite_number(record.air_quality_index_value.as_ref());

    let location = Coordinate::new(latitude, longitude);
    let distance = distance_km(user, location);
    if !distance.is_finite() {
        trace!(?location, "skipping station with non-finite distance");
        return None;
    }

    Some(Station {
        name: station_name(record),
        location,
        feed_aqi,
        distance_km: distance,
    })
}

/// Resolve a display name: `stationName`, then `name`, then `station`.
///
/// Empty or non-string values fall through to the next field; if none is
/// usable the placeholder `"NA"` is returned.
pub fn station_name(record: &RawStationRecord) -> String {
    [&record.station_name, &record.name, &record.station]
        .into_iter()
        .find_map(|field| non_empty_str(field.as_ref()))
        .unwrap_or(UNKNOWN_STATION_NAME)
        .to_string()
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
