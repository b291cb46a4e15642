use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::core::outcome::{DegradeReason, Outcome};
use crate::core::prompt::{scoring_user_message, PromptBudgets, SCORING_SYSTEM_PROMPT};
use crate::core::validation::{parse_response, validate_and_normalize};
use crate::models::{sort_canonical, CandidateListing, MatchResult, UserProfile};
use crate::services::{CompletionClient, CompletionRequest};

/// Candidates per model call
pub const DEFAULT_BATCH_SIZE: usize = 40;

/// AI scorer tuning
#[derive(Debug, Clone)]
pub struct AiScorerConfig {
    pub model: String,
    pub temperature: f32,
    pub batch_size: usize,
    pub timeout: Duration,
    pub budgets: PromptBudgets,
}

impl Default for AiScorerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: Duration::from_secs(25),
            budgets: PromptBudgets::default(),
        }
    }
}

/// Language-model compatibility scorer
///
/// # Pipeline
/// 1. Split candidates into batches
/// 2. One model call per batch, raced against a timeout, retried once when
///    the answer does not look like a JSON array
/// 3. Parse and repair each batch's output
/// 4. Fill in candidates the model never scored, sort canonically
pub struct AiScorer {
    client: Option<Arc<dyn CompletionClient>>,
    config: AiScorerConfig,
}

impl AiScorer {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, config: AiScorerConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Score `candidates` for `user`.
    ///
    /// Returns `None` when no client is configured, when there is nothing to
    /// score, or when no batch produced a single usable result. Callers fall
    /// back to the heuristic scorer in that case.
    pub async fn score(
        &self,
        user: &UserProfile,
        candidates: &[CandidateListing],
    ) -> Option<Vec<MatchResult>> {
        let client = self.client.as_ref()?;
        if candidates.is_empty() {
            return None;
        }

        let batch_size = self.config.batch_size.max(1);
        let mut validated: Vec<MatchResult> = Vec::with_capacity(candidates.len());

        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            match self.score_batch(client.as_ref(), user, batch).await {
                Outcome::Ok(results) => {
                    tracing::debug!(batch = index, scored = results.len(), size = batch.len(), "Scored batch");
                    validated.extend(results);
                }
                Outcome::Degraded(_, reason) => {
                    tracing::warn!(batch = index, size = batch.len(), reason = %reason, "Batch scoring degraded");
                }
            }
        }

        if validated.is_empty() {
            tracing::warn!(candidates = candidates.len(), "No batch produced valid scores");
            return None;
        }

        Some(fill_gaps(validated, candidates))
    }

    /// Score a single batch. Degraded outcomes carry an empty result list.
    pub async fn score_batch(
        &self,
        client: &dyn CompletionClient,
        user: &UserProfile,
        batch: &[CandidateListing],
    ) -> Outcome<Vec<MatchResult>> {
        let request = CompletionRequest::new(
            self.config.model.clone(),
            self.config.temperature,
            SCORING_SYSTEM_PROMPT,
            scoring_user_message(user, batch, &self.config.budgets),
        );

        let mut text = String::new();
        let mut last_error = None;
        for attempt in 1..=2 {
            match self.complete_with_timeout(client, request.clone()).await {
                Outcome::Ok(answer) => {
                    text = answer;
                    last_error = None;
                }
                Outcome::Degraded(_, reason) => {
                    last_error = Some(reason);
                }
            }

            if looks_like_array(&text) {
                break;
            }
            if attempt == 1 {
                tracing::debug!(attempt, "Model answer is not a JSON array, retrying");
            }
        }

        let raw = match parse_response(&text) {
            Ok(raw) => raw,
            Err(parse_error) => {
                return Outcome::Degraded(Vec::new(), last_error.unwrap_or(parse_error));
            }
        };

        let allowed: HashSet<&str> = batch.iter().map(|c| c.id.as_str()).collect();
        let results = validate_and_normalize(&raw, &allowed);

        if results.is_empty() {
            return Outcome::Degraded(
                results,
                DegradeReason::UnexpectedShape("no entry matched a requested id".into()),
            );
        }

        Outcome::Ok(results)
    }

    /// Race the model call against the configured timeout. Losing the race
    /// drops the request future, which cancels it.
    async fn complete_with_timeout(
        &self,
        client: &dyn CompletionClient,
        request: CompletionRequest,
    ) -> Outcome<String> {
        tokio::select! {
            result = client.complete(request) => match result {
                Ok(text) => Outcome::Ok(text),
                Err(e) => Outcome::Degraded(String::new(), DegradeReason::Llm(e)),
            },
            _ = tokio::time::sleep(self.config.timeout) => {
                Outcome::Degraded(String::new(), DegradeReason::Timeout(self.config.timeout.as_millis()))
            }
        }
    }
}

fn looks_like_array(text: &str) -> bool {
    text.trim_start().starts_with('[')
}

/// Add a zero score for every input id without a validated result, then sort
pub fn fill_gaps(mut validated: Vec<MatchResult>, candidates: &[CandidateListing]) -> Vec<MatchResult> {
    let mut covered: HashSet<String> = HashSet::with_capacity(candidates.len());
    validated.retain(|r| covered.insert(r.id.clone()));

    for candidate in candidates {
        if covered.insert(candidate.id.clone()) {
            validated.push(MatchResult::unscored(candidate.id.clone()));
        }
    }

    sort_canonical(&mut validated);
    validated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_gaps_adds_missing_and_dedupes() {
        let candidates = vec![
            CandidateListing::new("a"),
            CandidateListing::new("b"),
            CandidateListing::new("b"),
            CandidateListing::new("c"),
        ];
        let validated = vec![MatchResult::new("c", 40, false)];

        let results = fill_gaps(validated, &candidates);

        assert_eq!(
            results,
            vec![
                MatchResult::new("c", 40, false),
                MatchResult::unscored("a"),
                MatchResult::unscored("b"),
            ]
        );
    }

    #[test]
    fn test_looks_like_array() {
        assert!(looks_like_array("  [1]"));
        assert!(!looks_like_array("```json\n[1]```"));
        assert!(!looks_like_array(""));
    }

    #[tokio::test]
    async fn test_disabled_scorer_returns_none() {
        let scorer = AiScorer::new(None, AiScorerConfig::default());
        let user = UserProfile {
            id: "u".to_string(),
            preferences: Default::default(),
        };

        assert!(scorer.score(&user, &[CandidateListing::new("a")]).await.is_none());
    }
}
