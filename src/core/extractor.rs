use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::core::canonical::{
    aliases, normalize_bool, normalize_date, normalize_date_time, normalize_price, normalize_text,
    pick_field,
};
use crate::core::outcome::{DegradeReason, Outcome};
use crate::core::prompt::{
    extraction_schema, extraction_user_message, EXTRACTION_SCHEMA_NAME, EXTRACTION_SYSTEM_PROMPT,
};
use crate::models::{Direction, Gender, ListingDraft, ListingKind};
use crate::services::{CompletionClient, CompletionRequest, JsonSchemaFormat, LlmError};

/// Titles shorter than this are replaced by a synthesized one
pub const MIN_TITLE_CHARS: usize = 8;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// Extractor tuning
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub min_title_chars: usize,
    pub currency_symbol: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(25),
            min_title_chars: MIN_TITLE_CHARS,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

/// Words used when a title has to be synthesized
struct TitleLabels {
    seeking: &'static str,
    offering: &'static str,
    lodging: &'static str,
    rail: &'static str,
}

fn title_labels(locale: &str) -> TitleLabels {
    let language = locale
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match language.as_str() {
        "it" => TitleLabels {
            seeking: "Cerco",
            offering: "Vendo",
            lodging: "Hotel",
            rail: "Treno",
        },
        _ => TitleLabels {
            seeking: "SEEKING",
            offering: "OFFERING",
            lodging: "hotel",
            rail: "rail",
        },
    }
}

/// Turns a free-text ad into a canonical [`ListingDraft`]
pub struct Extractor {
    client: Option<Arc<dyn CompletionClient>>,
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, config: ExtractorConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Extract a draft from `free_text`. Never fails: every error yields the
    /// empty draft.
    pub async fn extract(&self, free_text: &str, locale: &str) -> ListingDraft {
        self.extract_outcome(free_text, locale).await.into_inner()
    }

    /// Same as [`Extractor::extract`] but keeps the reason for a fallback
    pub async fn extract_outcome(&self, free_text: &str, locale: &str) -> Outcome<ListingDraft> {
        if free_text.trim().is_empty() {
            return Outcome::Ok(ListingDraft::empty());
        }

        let client = match &self.client {
            Some(client) => client,
            None => {
                return Outcome::Degraded(
                    ListingDraft::empty(),
                    DegradeReason::Llm(LlmError::MissingCredentials),
                )
            }
        };

        let request = CompletionRequest::new(
            self.config.model.clone(),
            self.config.temperature,
            EXTRACTION_SYSTEM_PROMPT,
            extraction_user_message(free_text, locale),
        )
        .with_schema(JsonSchemaFormat::strict(
            EXTRACTION_SCHEMA_NAME,
            extraction_schema(),
        ));

        let text = tokio::select! {
            result = client.complete(request) => match result {
                Ok(text) => text,
                Err(e) => return self.degrade(DegradeReason::Llm(e)),
            },
            _ = tokio::time::sleep(self.config.timeout) => {
                return self.degrade(DegradeReason::Timeout(self.config.timeout.as_millis()));
            }
        };

        let parsed: Value = match serde_json::from_str(text.trim()) {
            Ok(value) => value,
            Err(e) => return self.degrade(DegradeReason::InvalidJson(e.to_string())),
        };

        match parsed {
            Value::Object(obj) => {
                let draft = self.canonicalize(&obj, locale);
                tracing::debug!(kind = ?draft.kind, direction = ?draft.direction, "Extracted listing draft");
                Outcome::Ok(draft)
            }
            other => self.degrade(DegradeReason::UnexpectedShape(format!(
                "expected an object, got {}",
                json_type(&other)
            ))),
        }
    }

    fn degrade(&self, reason: DegradeReason) -> Outcome<ListingDraft> {
        tracing::warn!(reason = %reason, "Listing extraction degraded to empty draft");
        Outcome::Degraded(ListingDraft::empty(), reason)
    }

    /// Map the model's object onto the empty draft, then enforce the kind
    /// invariants and fill in a title if needed
    pub fn canonicalize(&self, obj: &Map<String, Value>, locale: &str) -> ListingDraft {
        let mut draft = ListingDraft {
            direction: token(obj, aliases::DIRECTION).and_then(Direction::parse),
            kind: token(obj, aliases::KIND).and_then(ListingKind::parse),
            title: text(obj, aliases::TITLE),
            location: text(obj, aliases::LOCATION),
            check_in: pick_field(obj, aliases::CHECK_IN)
                .and_then(normalize_date)
                .unwrap_or_default(),
            check_out: pick_field(obj, aliases::CHECK_OUT)
                .and_then(normalize_date)
                .unwrap_or_default(),
            depart_at: pick_field(obj, aliases::DEPART_AT)
                .and_then(normalize_date_time)
                .unwrap_or_default(),
            arrive_at: pick_field(obj, aliases::ARRIVE_AT)
                .and_then(normalize_date_time)
                .unwrap_or_default(),
            return_at: pick_field(obj, aliases::RETURN_AT).and_then(normalize_date_time),
            is_named_ticket: pick_field(obj, aliases::IS_NAMED_TICKET).and_then(normalize_bool),
            traveler_gender: token(obj, aliases::TRAVELER_GENDER).and_then(Gender::parse),
            booking_reference: text(obj, aliases::BOOKING_REFERENCE),
            price: pick_field(obj, aliases::PRICE)
                .and_then(normalize_price)
                .unwrap_or_default(),
        };

        draft.suppress_out_of_kind();

        if draft.title.chars().count() < self.config.min_title_chars {
            if let Some(title) = synthesize_title(&draft, locale, &self.config.currency_symbol) {
                draft.title = title;
            }
        }

        draft
    }
}

/// `<direction> <kind> <location> <date> <price?>`, or `None` when any of
/// direction, kind or location is unknown
pub fn synthesize_title(draft: &ListingDraft, locale: &str, currency_symbol: &str) -> Option<String> {
    let labels = title_labels(locale);

    let direction = match draft.direction? {
        Direction::Seeking => labels.seeking,
        Direction::Offering => labels.offering,
    };
    let (kind, date) = match draft.kind? {
        ListingKind::Lodging => (labels.lodging, draft.check_in.as_str()),
        ListingKind::Rail => (labels.rail, draft.depart_at.get(..10).unwrap_or_default()),
    };
    if draft.location.is_empty() {
        return None;
    }

    let mut parts = vec![direction.to_string(), kind.to_string(), draft.location.clone()];
    if !date.is_empty() {
        parts.push(date.to_string());
    }
    if !draft.price.is_empty() {
        parts.push(format!("{}{}", currency_symbol, draft.price));
    }

    Some(parts.join(" "))
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> String {
    pick_field(obj, keys)
        .and_then(normalize_text)
        .unwrap_or_default()
}

fn token<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    pick_field(obj, keys).and_then(Value::as_str)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
