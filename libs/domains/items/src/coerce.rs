//! Field coercion: untyped query-string or JSON input into validated fields.
//!
//! Every function here is pure.

use serde_json::Value;

use crate::error::{ItemError, ItemResult};
use crate::models::NewItem;

pub const LIMIT_MIN: u64 = 1;
pub const LIMIT_MAX: u64 = 100;

/// Trimmed, non-empty name
pub fn coerce_name(raw: Option<&str>) -> ItemResult<String> {
    let name = raw.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ItemError::validation("name required"));
    }
    Ok(name.to_string())
}

/// Finite, non-negative number
pub fn coerce_value(raw: Option<&str>) -> ItemResult<f64> {
    let value = raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| ItemError::validation("value must be a number"))?;

    if value < 0.0 {
        return Err(ItemError::validation("value must be non-negative"));
    }
    // Normalise -0.0
    Ok(value + 0.0)
}

/// Trimmed note; absent means empty
pub fn coerce_note(raw: Option<&str>) -> String {
    raw.map(str::trim).unwrap_or_default().to_string()
}

/// Integer limit clamped into `[LIMIT_MIN, LIMIT_MAX]`; unparsable or absent
/// input falls back to `default`. Never fails.
pub fn coerce_limit(raw: Option<&str>, default: u64) -> u64 {
    let parsed = raw
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(default as i64);

    parsed.clamp(LIMIT_MIN as i64, LIMIT_MAX as i64) as u64
}

/// Optional numeric bound; blank means absent
pub fn coerce_bound(raw: Option<&str>, field: &str) -> ItemResult<Option<f64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .map(Some)
            .ok_or_else(|| ItemError::validation(format!("{} must be a number", field))),
    }
}

/// Truthy flag: JSON `true`, or `1|true|yes` in any case
pub fn coerce_flag(raw: Option<&Value>) -> bool {
    match raw {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    }
}

/// Text form of a JSON scalar; `null` and absence are both `None`
pub fn json_text(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Borrow `body` as a JSON object
pub fn as_object(body: &Value) -> ItemResult<&serde_json::Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| ItemError::validation("expected a JSON object"))
}

/// Coerce a full item definition from a JSON object
pub fn coerce_new_item(body: &Value) -> ItemResult<NewItem> {
    let obj = as_object(body)?;

    Ok(NewItem {
        name: coerce_name(json_text(obj.get("name")).as_deref())?,
        value: coerce_value(json_text(obj.get("value")).as_deref())?,
        note: coerce_note(json_text(obj.get("note")).as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_name_trims() {
        assert_eq!(coerce_name(Some("  apple ")).unwrap(), "apple");
    }

    #[test]
    fn test_coerce_name_rejects_blank() {
        for raw in [None, Some(""), Some("   ")] {
            let err = coerce_name(raw).unwrap_err();
            assert_eq!(err.to_string(), "name required");
        }
    }

    #[test]
    fn test_coerce_value_parses_numbers() {
        assert_eq!(coerce_value(Some("12.5")).unwrap(), 12.5);
        assert_eq!(coerce_value(Some(" 0 ")).unwrap(), 0.0);
        assert_eq!(coerce_value(Some("1e3")).unwrap(), 1000.0);
    }

    #[test]
    fn test_coerce_value_rejects_non_numbers() {
        for raw in [None, Some("abc"), Some(""), Some("NaN"), Some("inf")] {
            let err = coerce_value(raw).unwrap_err();
            assert_eq!(err.to_string(), "value must be a number");
        }
    }

    #[test]
    fn test_coerce_value_rejects_negative() {
        let err = coerce_value(Some("-0.01")).unwrap_err();
        assert_eq!(err.to_string(), "value must be non-negative");
    }

    #[test]
    fn test_coerce_value_negative_zero_is_zero() {
        let value = coerce_value(Some("-0")).unwrap();
        assert!(value.is_sign_positive());
    }

    #[test]
    fn test_coerce_note_defaults_to_empty() {
        assert_eq!(coerce_note(None), "");
        assert_eq!(coerce_note(Some("  ripe  ")), "ripe");
    }

    #[test]
    fn test_coerce_limit_clamps_and_falls_back() {
        assert_eq!(coerce_limit(None, 20), 20);
        assert_eq!(coerce_limit(Some("abc"), 20), 20);
        assert_eq!(coerce_limit(Some("5"), 20), 5);
        assert_eq!(coerce_limit(Some("0"), 20), 1);
        assert_eq!(coerce_limit(Some("-3"), 20), 1);
        assert_eq!(coerce_limit(Some("1000"), 20), 100);
        assert_eq!(coerce_limit(None, 500), 100);
    }

    #[test]
    fn test_coerce_bound() {
        assert_eq!(coerce_bound(None, "min_value").unwrap(), None);
        assert_eq!(coerce_bound(Some(" "), "min_value").unwrap(), None);
        assert_eq!(coerce_bound(Some("10"), "min_value").unwrap(), Some(10.0));

        let err = coerce_bound(Some("ten"), "max_value").unwrap_err();
        assert_eq!(err.to_string(), "max_value must be a number");
    }

    #[test]
    fn test_coerce_flag() {
        assert!(coerce_flag(Some(&json!(true))));
        assert!(coerce_flag(Some(&json!("YES"))));
        assert!(coerce_flag(Some(&json!(1))));
        assert!(!coerce_flag(Some(&json!("no"))));
        assert!(!coerce_flag(None));
    }

    #[test]
    fn test_coerce_new_item_accepts_string_and_number_values() {
        let item = coerce_new_item(&json!({"name": " pear ", "value": "3.5"})).unwrap();
        assert_eq!(
            item,
            NewItem {
                name: "pear".into(),
                value: 3.5,
                note: String::new()
            }
        );

        let item = coerce_new_item(&json!({"name": "plum", "value": 4, "note": null})).unwrap();
        assert_eq!(item.value, 4.0);
        assert_eq!(item.note, "");
    }

    #[test]
    fn test_coerce_new_item_requires_object() {
        let err = coerce_new_item(&json!(["name", "value"])).unwrap_err();
        assert_eq!(err.to_string(), "expected a JSON object");
    }

    #[test]
    fn test_coerce_new_item_reports_first_failing_field() {
        let err = coerce_new_item(&json!({"name": "", "value": -1})).unwrap_err();
        assert_eq!(err.to_string(), "name required");

        let err = coerce_new_item(&json!({"name": "a", "value": true})).unwrap_err();
        assert_eq!(err.to_string(), "value must be a number");
    }
}
