//! Normalized AQICN reading.

use serde::Serialize;

/// Which page layout a reading was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceLayout {
    /// Full station page with a `#station-header` block
    StationHeader,
    /// Compact widget with `#aqiwgtvalue`
    Widget,
    /// No recognised structure
    None,
}

impl SourceLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLayout::StationHeader => "station-header",
            SourceLayout::Widget => "widget",
            SourceLayout::None => "none",
        }
    }
}

/// Station readings as displayed on AQICN.
///
/// All values are the page's own text, not parsed numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeReading {
    pub source_layout: SourceLayout,
    pub aqi: Option<String>,
    pub message: Option<String>,
    pub updated: Option<String>,
    pub pm25: Option<String>,
    pub pm10: Option<String>,
    pub url: Option<String>,
}

impl ScrapeReading {
    /// An empty reading for a page with no recognised layout.
    pub fn empty(url: Option<String>) -> Self {
        Self {
            source_layout: SourceLayout::None,
            aqi: None,
            message: None,
            updated: None,
            pm25: None,
            pm10: None,
            url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layout_tags() {
        for layout in [
            SourceLayout::StationHeader,
            SourceLayout::Widget,
            SourceLayout::None,
        ] {
            assert_eq!(serde_json::to_value(layout).unwrap(), json!(layout.as_str()));
        }
    }

    #[test]
    fn empty_reading_serializes_nulls() {
        let reading = ScrapeReading::empty(Some("https://aqicn.org/city/delhi".into()));
        assert_eq!(
            serde_json::to_value(&reading).unwrap(),
            json!({
                "sourceLayout": "none",
                "aqi": null,
                "message": null,
                "updated": null,
                "pm25": null,
                "pm10": null,
                "url": "https://aqicn.org/city/delhi"
            })
        );
    }
}
