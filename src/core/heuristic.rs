use std::collections::HashSet;

use crate::models::{sort_canonical, CandidateListing, HeuristicWeights, MatchResult, UserPreferences, UserProfile};

/// Deterministic, network-free compatibility scorer
///
/// Scoring formula:
/// score = base                      # 60
///     + kind_bonus                  # 15, kind is one of the preferred kinds
///     + price_bonus                 # 10, price known and within maxPrice
///     + location_bonus              # 10, location contains preferred place
///
/// Clamped to [0, 100] and rounded; bidirectional when score >= threshold (80).
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    weights: HeuristicWeights,
}

impl HeuristicScorer {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: HeuristicWeights::default(),
        }
    }

    /// Score every distinct candidate, canonical order
    pub fn score(&self, user: &UserProfile, candidates: &[CandidateListing]) -> Vec<MatchResult> {
        let preferred_location = user
            .preferences
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_lowercase);

        let mut seen = HashSet::with_capacity(candidates.len());
        let mut results: Vec<MatchResult> = candidates
            .iter()
            .filter(|candidate| seen.insert(candidate.id.as_str()))
            .map(|candidate| {
                let score = self.score_candidate(&user.preferences, preferred_location.as_deref(), candidate);
                MatchResult::new(
                    candidate.id.clone(),
                    score,
                    f64::from(score) >= self.weights.bidirectional_threshold,
                )
            })
            .collect();

        sort_canonical(&mut results);
        results
    }

    #[inline]
    fn score_candidate(
        &self,
        preferences: &UserPreferences,
        preferred_location: Option<&str>,
        candidate: &CandidateListing,
    ) -> u8 {
        let mut score = self.weights.base;

        // Stage 1: kind preference
        if candidate
            .kind
            .map(|kind| preferences.kinds.contains(&kind))
            .unwrap_or(false)
        {
            score += self.weights.kind_bonus;
        }

        // Stage 2: price within budget (unbounded when no maxPrice)
        if let Some(price) = candidate.price {
            if preferences.max_price.map_or(true, |max| price <= max) {
                score += self.weights.price_bonus;
            }
        }

        // Stage 3: location substring
        if let (Some(wanted), Some(location)) = (preferred_location, candidate.location.as_deref()) {
            if location.to_lowercase().contains(wanted) {
                score += self.weights.location_bonus;
            }
        }

        score.clamp(0.0, 100.0).round() as u8
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
