//! Travel Match - listing extraction and compatibility scoring
//!
//! This library turns free-text travel ads into canonical listing drafts and
//! ranks candidate hotel/train listings against a user's preferences, using a
//! language model when one is configured and a deterministic heuristic
//! otherwise.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{AiScorer, Extractor, HeuristicScorer, Matcher, Outcome};
pub use models::{CandidateListing, ListingDraft, ListingKind, MatchResult, UserPreferences, UserProfile};
pub use services::{CompletionClient, OpenAiClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let draft = ListingDraft::empty();
        assert!(draft.kind.is_none());
        assert!(HeuristicScorer::default().score(&UserProfile {
            id: "u".to_string(),
            preferences: UserPreferences::default(),
        }, &[]).is_empty());
    }
}
