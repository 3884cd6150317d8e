//! Search-result link resolution.

/// Turn a search-result `href` into an absolute URL on `origin`.
///
/// - missing or blank → `None`
/// - `http://` / `https://` → unchanged (trimmed)
/// - `/path` → `origin` + `/path`
/// - `path` → `origin` + `/` + `path`
///
/// `origin` is expected without a trailing slash, e.g. `https://aqicn.org`.
///
/// # Examples
///
/// ```
/// use aqi_server::aqicn::resolve_station_url;
///
/// let origin = "https://aqicn.org";
/// assert_eq!(
///     resolve_station_url(origin, Some("/city/delhi/")).as_deref(),
///     Some("https://aqicn.org/city/delhi/")
/// );
/// assert_eq!(resolve_station_url(origin, Some("  ")), None);
/// ```
pub fn resolve_station_url(origin: &str, href: Option<&str>) -> Option<String> {
    let href = href?.trim();
    if href.is_empty() {
        return None;
    }

    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    let origin = origin.trim_end_matches('/');
    if href.starts_with('/') {
        Some(format!("{origin}{href}"))
    } else {
        Some(format!("{origin}/{href}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://aqicn.org";

    #[test]
    fn root_relative() {
        assert_eq!(
            resolve_station_url(ORIGIN, Some("/x")).as_deref(),
            Some("https://aqicn.org/x")
        );
    }

    #[test]
    fn absolute_unchanged() {
        assert_eq!(
            resolve_station_url(ORIGIN, Some("https://y/z")).as_deref(),
            Some("https://y/z")
        );
        assert_eq!(
            resolve_station_url(ORIGIN, Some("http://y/z")).as_deref(),
            Some("http://y/z")
        );
    }

    #[test]
    fn empty_and_missing() {
        assert_eq!(resolve_station_url(ORIGIN, Some("")), None);
        assert_eq!(resolve_station_url(ORIGIN, Some("   ")), None);
        assert_eq!(resolve_station_url(ORIGIN, None), None);
    }

    #[test]
    fn bare_relative_path() {
        assert_eq!(
            resolve_station_url(ORIGIN, Some("city/india/delhi/")).as_deref(),
            Some("https://aqicn.org/city/india/delhi/")
        );
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(
            resolve_station_url(ORIGIN, Some("  /station/@1234  ")).as_deref(),
            Some("https://aqicn.org/station/@1234")
        );
    }

    #[test]
    fn origin_trailing_slash_tolerated() {
        assert_eq!(
            resolve_station_url("http://127.0.0.1:9000/", Some("/x")).as_deref(),
            Some("http://127.0.0.1:9000/x")
        );
    }
}
