//! Layout-polymorphic reading of AQICN station pages.
//!
//! AQICN serves station data in (at least) two structures. A marker element
//! decides which one a page uses, probed in a fixed priority order; each
//! layout then has its own reader. Every field read is independent and
//! degrades to `None` on a missing element, so a partially rendered page
//! still yields whatever it has.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::reading::{ScrapeReading, SourceLayout};

/// Elements that indicate station content has rendered.
///
/// Used by the orchestrator to decide when a page is ready to read.
pub const CONTENT_MARKERS: &str = "#station-header, #aqiwgtvalue, #cur_pm25";

struct Selectors {
    header: Selector,
    header_cell: Selector,
    header_label: Selector,
    species_row: Selector,
    species_name: Selector,
    species_value: Selector,
    widget_value: Selector,
    widget_info: Selector,
    widget_time: Selector,
    widget_pm25: Selector,
    widget_pm10: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    header: css("#station-header"),
    header_cell: css("td"),
    header_label: css("span"),
    species_row: css("table.station-table-species tr"),
    species_name: css(".station-specie-name"),
    species_value: css(".station-specie-aqi"),
    widget_value: css("#aqiwgtvalue"),
    widget_info: css("#aqiwgtinfo"),
    widget_time: css("#aqiwgtutime"),
    widget_pm25: css("#cur_pm25"),
    widget_pm10: css("#cur_pm10"),
});

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector is valid CSS")
}

/// Layout found by probing a document, holding its marker element.
enum Layout<'a> {
    StationHeader(ElementRef<'a>),
    Widget(ElementRef<'a>),
    None,
}

/// Read a normalized station reading out of a page's HTML.
///
/// Never fails: a page with no recognised layout produces an all-`None`
/// reading tagged [`SourceLayout::None`].
pub fn extract_reading(html: &str, url: Option<String>) -> ScrapeReading {
    let document = Html::parse_document(html);

    match probe(&document) {
        Layout::StationHeader(header) => read_station_header(&document, header, url),
        Layout::Widget(value) => read_widget(&document, value, url),
        Layout::None => ScrapeReading::empty(url),
    }
}

fn probe(document: &Html) -> Layout<'_> {
    if let Some(header) = document.select(&SELECTORS.header).next() {
        return Layout::StationHeader(header);
    }
    if let Some(value) = document.select(&SELECTORS.widget_value).next() {
        return Layout::Widget(value);
    }
    Layout::None
}

fn read_station_header(
    document: &Html,
    header: ElementRef<'_>,
    url: Option<String>,
) -> ScrapeReading {
    let aqi = header.select(&SELECTORS.header_cell).next().map(text);

    // Headline label followed by its sub-label, e.g. "Unhealthy" + "for sensitive groups"
    let message = header.select(&SELECTORS.header_label).next().and_then(|main| {
        let sub = main.next_siblings().find_map(ElementRef::wrap)?;
        Some(format!("{} {}", text(main), text(sub)))
    });

    let updated = header
        .select(&SELECTORS.header_label)
        .map(text)
        .find(|label| label.to_lowercase().starts_with("updated"));

    let mut pm25 = None;
    let mut pm10 = None;
    for row in document.select(&SELECTORS.species_row) {
        let (Some(name), Some(value)) = (
            row.select(&SELECTORS.species_name).next(),
            row.select(&SELECTORS.species_value).next(),
        ) else {
            continue;
        };

        match compact_text(name).as_str() {
            "PM2.5" => pm25 = Some(text(value)),
            "PM10" => pm10 = Some(text(value)),
            _ => {}
        }
    }

    ScrapeReading {
        source_layout: SourceLayout::StationHeader,
        aqi,
        message,
        updated,
        pm25,
        pm10,
        url,
    }
}

fn read_widget(document: &Html, value: ElementRef<'_>, url: Option<String>) -> ScrapeReading {
    let field = |selector: &Selector| document.select(selector).next().map(text);

    ScrapeReading {
        source_layout: SourceLayout::Widget,
        aqi: Some(text(value)),
        message: field(&SELECTORS.widget_info),
        updated: field(&SELECTORS.widget_time),
        pm25: field(&SELECTORS.widget_pm25),
        pm10: field(&SELECTORS.widget_pm10),
        url,
    }
}

/// Rendered text of an element: script and style contents dropped, each
/// whitespace run collapsed to one space, ends trimmed.
fn text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible_text(element, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Element text with all whitespace removed ("PM 2.5" → "PM2.5").
fn compact_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_visible_text(element, &mut raw);
    raw.retain(|c| !c.is_whitespace());
    raw
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(child) {
            if !matches!(child.value().name(), "script" | "style" | "noscript") {
                push_visible_text(child, out);
            }
        }
    }
}
