// Model exports
pub mod domain;
pub mod lenient;
pub mod requests;
pub mod responses;

pub use domain::{
    canonical_order, sort_canonical, CandidateListing, Direction, Gender, HeuristicWeights, ListingDraft,
    ListingKind, MatchResult, UserPreferences, UserProfile,
};
pub use requests::{ExtractListingRequest, RequestError, ScoreMatchesRequest};
pub use responses::{ErrorBody, ErrorResponse, HealthResponse, ScoreMatchesResponse, ScoredListing};
