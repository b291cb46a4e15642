use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::models::domain::{CandidateListing, UserProfile};

/// Caller contract violations on the match endpoint
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("user is required")]
    MissingUser,

    #[error("invalid user: {0}")]
    InvalidUser(String),

    #[error("listings must be an array")]
    ListingsNotArray,

    #[error("invalid listing at index {index}: {message}")]
    InvalidListing { index: usize, message: String },
}

/// Request to score listings for a user
///
/// POST /api/v1/matches
#[derive(Debug, Clone, Serialize)]
pub struct ScoreMatchesRequest {
    pub user: UserProfile,
    pub listings: Vec<CandidateListing>,
}

impl ScoreMatchesRequest {
    /// Structural validation of a raw body, reported field by field
    pub fn from_value(body: Value) -> Result<Self, RequestError> {
        let Value::Object(mut body) = body else {
            return Err(RequestError::NotAnObject);
        };

        let user = match body.remove("user") {
            None | Some(Value::Null) => return Err(RequestError::MissingUser),
            Some(user @ Value::Object(_)) => serde_json::from_value::<UserProfile>(user)
                .map_err(|e| RequestError::InvalidUser(e.to_string()))?,
            Some(_) => return Err(RequestError::InvalidUser("user must be an object".into())),
        };

        let Some(Value::Array(raw_listings)) = body.remove("listings") else {
            return Err(RequestError::ListingsNotArray);
        };

        let listings = raw_listings
            .into_iter()
            .enumerate()
            .map(|(index, listing)| {
                serde_json::from_value::<CandidateListing>(listing).map_err(|e| {
                    RequestError::InvalidListing {
                        index,
                        message: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { user, listings })
    }
}

fn default_locale() -> String {
    "it".to_string()
}

/// Request to extract a listing draft from free text
///
/// POST /api/v1/listings/extract
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExtractListingRequest {
    pub text: String,
    #[validate(length(min = 2, max = 35))]
    #[serde(default = "default_locale")]
    pub locale: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_body() {
        let request = ScoreMatchesRequest::from_value(json!({
            "user": { "id": "u1", "preferences": { "kinds": ["RAIL"] } },
            "listings": [{ "id": "a" }, { "id": 2, "price": "12,5" }]
        }))
        .unwrap();

        assert_eq!(request.user.id, "u1");
        assert_eq!(request.listings.len(), 2);
        assert_eq!(request.listings[1].id, "2");
    }

    #[test]
    fn test_structural_errors() {
        assert_eq!(
            ScoreMatchesRequest::from_value(json!([])).unwrap_err(),
            RequestError::NotAnObject
        );
        assert_eq!(
            ScoreMatchesRequest::from_value(json!({ "listings": [] })).unwrap_err(),
            RequestError::MissingUser
        );
        assert_eq!(
            ScoreMatchesRequest::from_value(json!({ "user": null, "listings": [] })).unwrap_err(),
            RequestError::MissingUser
        );
        assert_eq!(
            ScoreMatchesRequest::from_value(json!({ "user": { "id": "u" }, "listings": {} })).unwrap_err(),
            RequestError::ListingsNotArray
        );
        assert_eq!(
            ScoreMatchesRequest::from_value(json!({ "user": { "id": "u" } })).unwrap_err(),
            RequestError::ListingsNotArray
        );
        assert!(matches!(
            ScoreMatchesRequest::from_value(json!({ "user": "u", "listings": [] })).unwrap_err(),
            RequestError::InvalidUser(_)
        ));
        assert!(matches!(
            ScoreMatchesRequest::from_value(json!({ "user": { "id": "u" }, "listings": [{ "title": "x" }] }))
                .unwrap_err(),
            RequestError::InvalidListing { index: 0, .. }
        ));
    }

    #[test]
    fn test_extract_request_defaults() {
        let request: ExtractListingRequest = serde_json::from_value(json!({ "text": "Vendo" })).unwrap();
        assert_eq!(request.locale, "it");
        assert!(request.validate().is_ok());

        let request: ExtractListingRequest =
            serde_json::from_value(json!({ "text": "x", "locale": "x" })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_extract_request_requires_text() {
        assert!(serde_json::from_value::<ExtractListingRequest>(json!({ "locale": "it" })).is_err());
        assert!(serde_json::from_value::<ExtractListingRequest>(json!({ "text": null })).is_err());
    }

    #[test]
    fn test_user_without_id() {
        let request = ScoreMatchesRequest::from_value(json!({
            "user": { "preferences": { "kinds": ["RAIL"], "maxPrice": 100, "location": "milan" } },
            "listings": [{ "id": "a", "kind": "RAIL", "price": 80, "location": "Milan Centrale" }]
        }))
        .unwrap();

        assert_eq!(request.user.id, "");
        assert_eq!(request.user.preferences.kinds, vec![crate::models::ListingKind::Rail]);
    }
}
