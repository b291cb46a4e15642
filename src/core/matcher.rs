use std::sync::Arc;

use crate::core::{ai_scorer::AiScorer, heuristic::HeuristicScorer};
use crate::models::{CandidateListing, MatchResult, UserProfile};

/// Which scorer produced a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Ai,
    Heuristic,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Ai => "ai",
            MatchSource::Heuristic => "heuristic",
        }
    }
}

/// Result of the matching process
#[derive(Debug)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub source: MatchSource,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Language-model scoring in batches
/// 2. Heuristic scoring when the model is unavailable or produced nothing
#[derive(Clone)]
pub struct Matcher {
    ai: Arc<AiScorer>,
    heuristic: HeuristicScorer,
}

impl Matcher {
    pub fn new(ai: Arc<AiScorer>, heuristic: HeuristicScorer) -> Self {
        Self { ai, heuristic }
    }

    pub fn ai_enabled(&self) -> bool {
        self.ai.is_enabled()
    }

    /// Score and rank `candidates` for `user`.
    ///
    /// Always returns one result per distinct candidate id, in canonical
    /// order, whichever scorer ends up producing it.
    pub async fn find_matches(&self, user: &UserProfile, candidates: &[CandidateListing]) -> MatchOutcome {
        if let Some(matches) = self.ai.score(user, candidates).await {
            return MatchOutcome {
                matches,
                source: MatchSource::Ai,
            };
        }

        MatchOutcome {
            matches: self.heuristic.score(user, candidates),
            source: MatchSource::Heuristic,
        }
    }
}
