//! Tolerant field deserializers for caller payloads.
//!
//! Listings arrive from a storage layer whose column types drifted over time
//! (numeric ids, prices stored as `"45,00"`, `hotel`/`train` kind tokens).

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::core::canonical::{normalize_price, normalize_text};
use crate::models::domain::ListingKind;

pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a non-empty string or number id, got {}",
            other
        ))),
    }
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(normalize_text))
}

pub fn optional_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(normalize_price)
        .and_then(|p| p.parse::<f64>().ok())
        .filter(|p| p.is_finite()))
}

pub fn optional_kind<'de, D>(deserializer: D) -> Result<Option<ListingKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(ListingKind::parse))
}

/// Unknown kind tokens are skipped rather than rejected; duplicates collapse.
pub fn kind_list<'de, D>(deserializer: D) -> Result<Vec<ListingKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let mut kinds = Vec::new();

    let tokens: Vec<Value> = match value {
        Some(Value::Array(items)) => items,
        Some(single @ Value::String(_)) => vec![single],
        _ => Vec::new(),
    };

    for kind in tokens
        .iter()
        .filter_map(Value::as_str)
        .filter_map(ListingKind::parse)
    {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    Ok(kinds)
}

#[cfg(test)]
mod tests {
    use crate::models::{CandidateListing, ListingKind, UserProfile};
    use serde_json::json;

    #[test]
    fn test_candidate_accepts_loose_types() {
        let listing: CandidateListing = serde_json::from_value(json!({
            "id": 42,
            "title": "  Room near station ",
            "type": "hotel",
            "price": "45,50",
            "location": ""
        }))
        .unwrap();

        assert_eq!(listing.id, "42");
        assert_eq!(listing.title.as_deref(), Some("Room near station"));
        assert_eq!(listing.kind, Some(ListingKind::Lodging));
        assert_eq!(listing.price, Some(45.5));
        assert!(listing.location.is_none());
        assert!(listing.description.is_none());
    }

    #[test]
    fn test_candidate_rejects_missing_id() {
        let result = serde_json::from_value::<CandidateListing>(json!({ "title": "x" }));
        assert!(result.is_err());

        let result = serde_json::from_value::<CandidateListing>(json!({ "id": "  " }));
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_preferences_aliases() {
        let user: UserProfile = serde_json::from_value(json!({
            "id": "u1",
            "preferences": {
                "kinds": ["RAIL", "train", "boat"],
                "max_price": "120",
                "location": "Roma"
            }
        }))
        .unwrap();

        assert_eq!(user.preferences.kinds, vec![ListingKind::Rail]);
        assert_eq!(user.preferences.max_price, Some(120.0));
        assert_eq!(user.preferences.location.as_deref(), Some("Roma"));
    }

    #[test]
    fn test_profile_without_preferences() {
        let user: UserProfile = serde_json::from_value(json!({ "id": "u2" })).unwrap();
        assert!(user.preferences.kinds.is_empty());
        assert!(user.preferences.max_price.is_none());
    }
}
