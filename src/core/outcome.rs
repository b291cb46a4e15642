use thiserror::Error;

use crate::services::LlmError;

/// Why a pipeline step fell back to its default value
#[derive(Debug, Error)]
pub enum DegradeReason {
    #[error("language model unavailable: {0}")]
    Llm(#[from] LlmError),

    #[error("language model call timed out after {0} ms")]
    Timeout(u128),

    #[error("model output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("model output has the wrong shape: {0}")]
    UnexpectedShape(String),
}

/// Result of a step that never fails outward.
///
/// `Degraded` carries the safe default together with the reason it was used,
/// so tests and logs can tell a real answer from a fallback.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Degraded(T, DegradeReason),
}

impl<T> Outcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded(..))
    }

    pub fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Outcome::Ok(_) => None,
            Outcome::Degraded(_, reason) => Some(reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded(value, _) => value,
        }
    }

    /// Collapse to the plain value at a component boundary
    pub fn into_inner(self) -> T {
        match self {
            Outcome::Ok(value) | Outcome::Degraded(value, _) => value,
        }
    }
}
