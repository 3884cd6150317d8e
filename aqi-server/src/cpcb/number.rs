//! Sanitization of feed-derived numeric fields.

use serde_json::Value;

/// Convert a raw feed value into a finite number.
///
/// - absent or `null` → `None`
/// - numbers → the value if finite
/// - strings → trimmed; empty or `"NA"` (any case) → `None`, otherwise
///   parsed and kept only if finite
/// - anything else → `None`
///
/// Never fails: every problem collapses to `None`.
pub fn parse_finite_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(finite),
        Value::String(s) => parse_finite_str(s),
        _ => None,
    }
}

/// Parse a textual number, treating blanks and `"NA"` as missing.
pub fn parse_finite_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NA") {
        return None;
    }
    trimmed.parse::<f64>().ok().and_then(finite)
}

fn finite(n: f64) -> Option<f64> {
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Option<f64> {
        parse_finite_number(Some(&v))
    }

    #[test]
    fn absent_and_null() {
        assert_eq!(parse_finite_number(None), None);
        assert_eq!(parse(Value::Null), None);
    }

    #[test]
    fn na_in_any_case() {
        assert_eq!(parse(json!("NA")), None);
        assert_eq!(parse(json!("na")), None);
        assert_eq!(parse(json!(" Na ")), None);
    }

    #[test]
    fn blanks() {
        assert_eq!(parse(json!("")), None);
        assert_eq!(parse(json!("   ")), None);
    }

    #[test]
    fn padded_string() {
        assert_eq!(parse(json!("  12.5 ")), Some(12.5));
        assert_eq!(parse(json!("-0.25")), Some(-0.25));
    }

    #[test]
    fn numbers() {
        assert_eq!(parse(json!(42)), Some(42.0));
        assert_eq!(parse(json!(28.6139)), Some(28.6139));
        assert_eq!(parse(json!(-7)), Some(-7.0));
    }

    #[test]
    fn non_finite_rejected() {
        // serde_json cannot hold infinities, so they arrive as null
        assert_eq!(parse(json!(f64::INFINITY)), None);
        assert_eq!(parse(json!("inf")), None);
        assert_eq!(parse(json!("-infinity")), None);
        assert_eq!(parse(json!("NaN")), None);
        assert_eq!(finite(f64::INFINITY), None);
        assert_eq!(finite(f64::NAN), None);
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(parse(json!("abc")), None);
        assert_eq!(parse(json!("12.5km")), None);
        assert_eq!(parse(json!(true)), None);
        assert_eq!(parse(json!([1.0])), None);
        assert_eq!(parse(json!({"value": 1.0})), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Arbitrary text never panics and never yields a non-finite number
        #[test]
        fn total_over_strings(s in ".*") {
            if let Some(n) = parse_finite_str(&s) {
                prop_assert!(n.is_finite());
            }
        }

        /// Formatted finite numbers survive surrounding whitespace
        #[test]
        fn finite_roundtrip(n in proptest::num::f64::NORMAL, pad in "[ \t]{0,3}") {
            let text = format!("{pad}{n}{pad}");
            prop_assert_eq!(parse_finite_str(&text), Some(n));
        }
    }
}
