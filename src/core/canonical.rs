//! Field canonicalization for loosely-typed listing data.
//!
//! Every function here is total: malformed input maps to `None`, never to a
//! panic or an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:$|[T ])").expect("valid date regex"));

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})[T ](\d{2}:\d{2})(?:$|[:.+\-Z ])").expect("valid date-time regex")
});

/// Alias keys per canonical field, in lookup priority order
pub mod aliases {
    pub const DIRECTION: &[&str] = &["cercoVendo", "cerco_vendo", "direction", "intent"];
    pub const KIND: &[&str] = &["kind", "type", "listingType", "listing_type"];
    pub const TITLE: &[&str] = &["title"];
    pub const LOCATION: &[&str] = &["location", "route", "place"];
    pub const CHECK_IN: &[&str] = &["checkIn", "check_in"];
    pub const CHECK_OUT: &[&str] = &["checkOut", "check_out"];
    pub const DEPART_AT: &[&str] = &["departAt", "depart_at", "departure", "departure_at"];
    pub const ARRIVE_AT: &[&str] = &["arriveAt", "arrive_at", "arrival", "arrival_at"];
    pub const RETURN_AT: &[&str] = &["returnAt", "return_at"];
    pub const IS_NAMED_TICKET: &[&str] = &[
        "isNamedTicket",
        "is_named_ticket",
        "namedTicket",
        "named_ticket",
    ];
    pub const TRAVELER_GENDER: &[&str] = &["travelerGender", "traveler_gender", "gender"];
    pub const BOOKING_REFERENCE: &[&str] = &[
        "bookingReference",
        "booking_reference",
        "bookingCode",
        "booking_code",
        "pnr",
    ];
    pub const PRICE: &[&str] = &["price", "amount"];
}

/// Trimmed text, `None` when blank. Numbers are rendered as text.
pub fn normalize_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_text_str(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn normalize_text_str(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `YYYY-MM-DD` from a date or date-time value
pub fn normalize_date(value: &Value) -> Option<String> {
    value.as_str().and_then(normalize_date_str)
}

pub fn normalize_date_str(s: &str) -> Option<String> {
    DATE_PREFIX
        .captures(s.trim())
        .map(|caps| caps[1].to_string())
}

/// `YYYY-MM-DDTHH:mm`; seconds and anything after them are dropped
pub fn normalize_date_time(value: &Value) -> Option<String> {
    value.as_str().and_then(normalize_date_time_str)
}

pub fn normalize_date_time_str(s: &str) -> Option<String> {
    DATE_TIME
        .captures(s.trim())
        .map(|caps| format!("{}T{}", &caps[1], &caps[2]))
}

/// Canonical decimal string. The numeric text is kept as written
/// (`"10.50"` stays `"10.50"`), only the decimal comma is rewritten.
pub fn normalize_price(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let f = n.as_f64()?;
            if f.is_finite() {
                Some(n.to_string())
            } else {
                None
            }
        }
        Value::String(s) => normalize_price_str(s),
        _ => None,
    }
}

pub fn normalize_price_str(s: &str) -> Option<String> {
    let candidate = s.replace(',', ".");
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    match candidate.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(candidate.to_string()),
        _ => None,
    }
}

/// Tri-state boolean: JSON booleans and the common textual spellings
pub fn normalize_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "si" | "sì" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// First non-null value stored under any of `keys`
pub fn pick_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text(&json!("  Milano  ")), Some("Milano".to_string()));
        assert_eq!(normalize_text(&json!("   ")), None);
        assert_eq!(normalize_text(&json!(null)), None);
        assert_eq!(normalize_text(&json!(12)), Some("12".to_string()));
        assert_eq!(normalize_text(&json!({"a": 1})), None);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date(&json!("2025-05-01")), Some("2025-05-01".to_string()));
        assert_eq!(normalize_date(&json!(" 2025-05-01T10:30:00Z ")), Some("2025-05-01".to_string()));
        assert_eq!(normalize_date(&json!("2025-05-01 10:30")), Some("2025-05-01".to_string()));
        assert_eq!(normalize_date(&json!("01/05/2025")), None);
        assert_eq!(normalize_date(&json!("2025-5-1")), None);
        assert_eq!(normalize_date(&json!("2025-05-012")), None);
        assert_eq!(normalize_date(&json!(20250501)), None);
    }

    #[test]
    fn test_normalize_date_time() {
        assert_eq!(
            normalize_date_time(&json!("2025-05-01 09:00")),
            Some("2025-05-01T09:00".to_string())
        );
        assert_eq!(
            normalize_date_time(&json!("2025-05-01T09:00:59")),
            Some("2025-05-01T09:00".to_string())
        );
        assert_eq!(
            normalize_date_time(&json!("2025-05-01T09:00:00.000+02:00")),
            Some("2025-05-01T09:00".to_string())
        );
        assert_eq!(normalize_date_time(&json!("2025-05-01")), None);
        assert_eq!(normalize_date_time(&json!("2025-05-01 9:00")), None);
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price(&json!("10.50")), Some("10.50".to_string()));
        assert_eq!(normalize_price(&json!("10,50")), Some("10.50".to_string()));
        assert_eq!(normalize_price(&json!(10)), Some("10".to_string()));
        assert_eq!(normalize_price(&json!(12.5)), Some("12.5".to_string()));
        assert_eq!(normalize_price(&json!(" 7 ")), Some("7".to_string()));
        assert_eq!(normalize_price(&json!("abc")), None);
        assert_eq!(normalize_price(&json!("")), None);
        assert_eq!(normalize_price(&json!("inf")), None);
        assert_eq!(normalize_price(&json!("1.234,50")), None);
    }

    #[test]
    fn test_pick_field_first_non_null() {
        let obj = json!({ "check_in": "2025-01-01", "checkIn": null });
        let obj = obj.as_object().unwrap();

        assert_eq!(pick_field(obj, aliases::CHECK_IN), Some(&json!("2025-01-01")));
        assert_eq!(pick_field(obj, aliases::CHECK_OUT), None);
    }

    #[test]
    fn test_pick_field_respects_alias_order() {
        let obj = json!({ "type": "RAIL", "kind": "LODGING" });
        let obj = obj.as_object().unwrap();

        assert_eq!(pick_field(obj, aliases::KIND), Some(&json!("LODGING")));
    }

    #[test]
    fn test_normalize_bool() {
        assert_eq!(normalize_bool(&json!(true)), Some(true));
        assert_eq!(normalize_bool(&json!("no")), Some(false));
        assert_eq!(normalize_bool(&json!("maybe")), None);
        assert_eq!(normalize_bool(&json!(null)), None);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("città", 4), "citt");
        assert_eq!(truncate_chars("città", 5), "città");
        assert_eq!(truncate_chars("città", 50), "città");
        assert_eq!(truncate_chars("", 3), "");
    }
}
