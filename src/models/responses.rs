use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::domain::{CandidateListing, ListingKind, MatchResult};

/// One ranked listing in the match response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredListing {
    pub id: String,
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ListingKind>,
    pub score: u8,
    pub bidirectional: bool,
}

/// Response for the match endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreMatchesResponse {
    pub matches: Vec<ScoredListing>,
}

impl ScoreMatchesResponse {
    /// Join results with their listings, keeping the result order
    pub fn from_results(results: Vec<MatchResult>, listings: &[CandidateListing]) -> Self {
        let mut by_id: HashMap<&str, &CandidateListing> = HashMap::with_capacity(listings.len());
        for listing in listings {
            by_id.entry(listing.id.as_str()).or_insert(listing);
        }

        let matches = results
            .into_iter()
            .map(|result| {
                let listing = by_id.get(result.id.as_str());
                ScoredListing {
                    title: listing.and_then(|l| l.title.clone()),
                    location: listing.and_then(|l| l.location.clone()),
                    kind: listing.and_then(|l| l.kind),
                    id: result.id,
                    score: result.score,
                    bidirectional: result.bidirectional,
                }
            })
            .collect();

        Self { matches }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "aiEnabled")]
    pub ai_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
}

/// Error response: `{ "error": { "message": ... } }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                message: message.into(),
            },
        }
    }
}
