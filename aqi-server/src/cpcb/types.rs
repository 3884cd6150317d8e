//! CPCB feed DTOs.
//!
//! The feed nests stations three levels deep (region → city → station) and
//! is noisy: arrays may be missing or `null`, individual entries may be the
//! wrong shape, and numeric fields arrive as numbers, strings, `"NA"` or
//! blanks. Every level therefore deserializes leniently, dropping entries
//! that do not fit rather than failing the whole document.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;

/// Top-level feed document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CpcbFeed {
    /// Regions (states) in the country.
    #[serde(default, deserialize_with = "lenient_vec")]
    pub country: Vec<Region>,
}

/// A region (state) and its cities.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Region {
    #[serde(default, rename = "citiesInState", deserialize_with = "lenient_vec")]
    pub cities: Vec<City>,
}

/// A city and its stations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct City {
    #[serde(default, rename = "stationsInCity", deserialize_with = "lenient_vec")]
    pub stations: Vec<RawStationRecord>,
}

/// A single station record, untouched.
///
/// Values are kept as raw JSON so that `parse_finite_number` is the one
/// place where they are sanitized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStationRecord {
    #[serde(default)]
    pub latitude: Option<Value>,

    #[serde(default)]
    pub longitude: Option<Value>,

    #[serde(default)]
    pub air_quality_index_value: Option<Value>,

    #[serde(default)]
    pub station_name: Option<Value>,

    #[serde(default)]
    pub name: Option<Value>,

    #[serde(default)]
    pub station: Option<Value>,
}

impl CpcbFeed {
    /// Parse a feed from a JSON value.
    ///
    /// Anything that is not an object yields an empty feed.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Iterate every station record in traversal order
    /// (region, then city, then station) without collecting them.
    pub fn stations(&self) -> impl Iterator<Item = &RawStationRecord> {
        self.country
            .iter()
            .flat_map(|region| region.cities.iter())
            .flat_map(|city| city.stations.iter())
    }
}

/// Deserialize an optional array, skipping elements that don't fit `T`.
///
/// `null`, a missing key, or a non-array value all become an empty `Vec`.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_feed() {
        let feed: CpcbFeed = serde_json::from_value(json!({
            "country": [{
                "stateName": "Delhi",
                "citiesInState": [{
                    "cityName": "Delhi",
                    "stationsInCity": [
                        {"stationName": "ITO", "latitude": "28.628", "longitude": 77.241},
                        {"stationName": "RK Puram", "latitude": "NA", "longitude": ""}
                    ]
                }]
            }]
        }))
        .unwrap();

        assert_eq!(feed.country.len(), 1);
        assert_eq!(feed.stations().count(), 2);
    }

    #[test]
    fn missing_country_is_empty() {
        let feed: CpcbFeed = serde_json::from_value(json!({"status": "ok"})).unwrap();
        assert!(feed.country.is_empty());
        assert_eq!(feed.stations().count(), 0);
    }

    #[test]
    fn null_levels_are_empty() {
        let feed: CpcbFeed = serde_json::from_value(json!({
            "country": [
                {"citiesInState": null},
                {"citiesInState": [{"stationsInCity": null}]},
                {"citiesInState": [{"stationsInCity": "garbage"}]}
            ]
        }))
        .unwrap();

        assert_eq!(feed.country.len(), 3);
        assert_eq!(feed.stations().count(), 0);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let feed: CpcbFeed = serde_json::from_value(json!({
            "country": [
                "not a region",
                42,
                {"citiesInState": [
                    null,
                    {"stationsInCity": [true, {"stationName": "Okay"}]}
                ]}
            ]
        }))
        .unwrap();

        assert_eq!(feed.country.len(), 1);
        let names: Vec<_> = feed.stations().map(|s| s.station_name.clone()).collect();
        assert_eq!(names, vec![Some(json!("Okay"))]);
    }

    #[test]
    fn non_object_document_is_empty() {
        assert_eq!(CpcbFeed::from_value(json!([1, 2, 3])).stations().count(), 0);
        assert_eq!(CpcbFeed::from_value(Value::Null).stations().count(), 0);
    }

    #[test]
    fn traversal_order_is_region_city_station() {
        let feed = CpcbFeed::from_value(json!({
            "country": [
                {"citiesInState": [
                    {"stationsInCity": [{"name": "a"}, {"name": "b"}]},
                    {"stationsInCity": [{"name": "c"}]}
                ]},
                {"citiesInState": [{"stationsInCity": [{"name": "d"}]}]}
            ]
        }));

        let names: Vec<_> = feed
            .stations()
            .filter_map(|s| s.name.as_ref().and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }
}
