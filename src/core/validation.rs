//! Parsing and repair of the scorer's model output.

use serde_json::Value;
use std::collections::HashSet;

use crate::core::outcome::DegradeReason;
use crate::models::{sort_canonical, MatchResult};

/// Object keys under which a model sometimes wraps the result array
const WRAPPER_KEYS: &[&str] = &["matches", "results", "scores"];

/// Parse model text into a list of raw entries.
///
/// Tries the whole text first, then the first balanced `[...]` inside it
/// (models like to surround JSON with prose or code fences).
pub fn parse_response(text: &str) -> Result<Vec<Value>, DegradeReason> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(entries) = unwrap_entries(value) {
            return Ok(entries);
        }
    }

    let slice = find_balanced_array(trimmed)
        .ok_or_else(|| DegradeReason::InvalidJson("no JSON array in model output".into()))?;

    match serde_json::from_str::<Value>(slice) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(_) => Err(DegradeReason::UnexpectedShape("expected an array".into())),
        Err(e) => Err(DegradeReason::InvalidJson(e.to_string())),
    }
}

fn unwrap_entries(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(mut obj) => WRAPPER_KEYS.iter().find_map(|key| match obj.remove(*key) {
            Some(Value::Array(entries)) => Some(entries),
            _ => None,
        }),
        _ => None,
    }
}

/// First balanced `[...]` substring, skipping brackets inside string literals
pub fn find_balanced_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Keep only entries for ids that were actually sent, coerce their fields
/// and return them deduplicated in canonical order
pub fn validate_and_normalize(raw: &[Value], allowed_ids: &HashSet<&str>) -> Vec<MatchResult> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut results = Vec::with_capacity(raw.len());

    for entry in raw {
        let Some(id) = entry.get("id").and_then(coerce_id) else {
            continue;
        };
        if !allowed_ids.contains(id.as_str()) || seen.contains(&id) {
            continue;
        }

        let score = entry.get("score").map(coerce_score).unwrap_or(0);
        let bidirectional = entry
            .get("bidirectional")
            .map(coerce_bool)
            .unwrap_or(false);

        seen.insert(id.clone());
        results.push(MatchResult::new(id, score, bidirectional));
    }

    sort_canonical(&mut results);
    results
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer score in [0, 100]; anything non-numeric or non-finite is 0
pub fn coerce_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(f) if f.is_finite() => f.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

/// Strict boolean from whatever the model wrote
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && f.is_finite()).unwrap_or(false),
        Value::String(s) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "no" | "0" | "null"
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids<'a>(list: &[&'a str]) -> HashSet<&'a str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_parse_plain_array() {
        let entries = parse_response(r#" [{"id":"a","score":5}] "#).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let entries = parse_response(r#"{"matches":[{"id":"a"},{"id":"b"}]}"#).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_parse_array_inside_prose() {
        let text = "Here you go:\n```json\n[{\"id\":\"a\",\"score\":70,\"note\":\"x]y\"}]\n```";
        let entries = parse_response(text).unwrap();
        assert_eq!(entries[0]["note"], "x]y");
    }

    #[test]
    fn test_parse_failure() {
        assert!(parse_response("no json here").is_err());
        assert!(parse_response("[{\"id\": ").is_err());
        assert!(parse_response("").is_err());
    }

    #[test]
    fn test_find_balanced_array_nested() {
        assert_eq!(find_balanced_array("x [1,[2,3]] [4]"), Some("[1,[2,3]]"));
        assert_eq!(find_balanced_array("[\"\\\"]\"]"), Some("[\"\\\"]\"]"));
        assert_eq!(find_balanced_array("[1,2"), None);
    }

    #[test]
    fn test_validate_drops_unknown_ids() {
        let raw = vec![
            json!({ "id": "a", "score": 50, "bidirectional": false }),
            json!({ "id": "ghost", "score": 99, "bidirectional": true }),
        ];
        let results = validate_and_normalize(&raw, &ids(&["a", "b"]));

        assert_eq!(results, vec![MatchResult::new("a", 50, false)]);
    }

    #[test]
    fn test_validate_coerces_fields() {
        let raw = vec![
            json!({ "id": "x", "score": 150, "bidirectional": "yes" }),
            json!({ "id": "y", "score": -3.2, "bidirectional": 0 }),
            json!({ "id": "z", "score": "64.6", "bidirectional": "false" }),
            json!({ "id": 7, "score": null }),
        ];
        let results = validate_and_normalize(&raw, &ids(&["x", "y", "z", "7"]));

        assert_eq!(
            results,
            vec![
                MatchResult::new("x", 100, true),
                MatchResult::new("z", 65, false),
                MatchResult::new("7", 0, false),
                MatchResult::new("y", 0, false),
            ]
        );
    }

    #[test]
    fn test_validate_keeps_first_duplicate() {
        let raw = vec![
            json!({ "id": "a", "score": 10 }),
            json!({ "id": "a", "score": 90 }),
        ];
        let results = validate_and_normalize(&raw, &ids(&["a"]));

        assert_eq!(results, vec![MatchResult::new("a", 10, false)]);
    }

    #[test]
    fn test_coerce_score_edge_cases() {
        assert_eq!(coerce_score(&json!(true)), 0);
        assert_eq!(coerce_score(&json!("NaN")), 0);
        assert_eq!(coerce_score(&json!("inf")), 0);
        assert_eq!(coerce_score(&json!(99.5)), 100);
        assert_eq!(coerce_score(&json!(42)), 42);
    }
}
