// Core pipeline exports
pub mod ai_scorer;
pub mod canonical;
pub mod extractor;
pub mod heuristic;
pub mod matcher;
pub mod outcome;
pub mod prompt;
pub mod validation;

pub use ai_scorer::{AiScorer, AiScorerConfig};
pub use extractor::{Extractor, ExtractorConfig};
pub use heuristic::HeuristicScorer;
pub use matcher::{MatchOutcome, MatchSource, Matcher};
pub use outcome::{DegradeReason, Outcome};
pub use validation::validate_and_normalize;
