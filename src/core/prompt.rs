//! Prompts and output schemas sent to the language model.

use serde_json::{json, Value};

use crate::core::canonical::truncate_chars;
use crate::models::{CandidateListing, UserProfile};

pub const EXTRACTION_SCHEMA_NAME: &str = "listing_draft";

pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You extract a structured travel listing from a user's free-text ad.
Rules:
- kind is \"LODGING\" for hotel rooms and stays, \"RAIL\" for train tickets, otherwise null.
- cercoVendo is \"SEEKING\" when the author is looking for something, \"OFFERING\" when selling or giving it away, otherwise null.
- checkIn and checkOut are dates formatted YYYY-MM-DD (LODGING only).
- departAt, arriveAt and returnAt are date-times formatted YYYY-MM-DD HH:mm (RAIL only).
- For RAIL, location is \"<origin> → <destination>\"; for LODGING it is the city or hotel area.
- isNamedTicket tells whether the ticket is issued to a named passenger; travelerGender is \"M\" or \"F\" only when it is.
- bookingReference is the short alphanumeric booking code, if written.
- price is a plain decimal number with a point separator, without currency.
- title is a short headline in the user's language.
Never invent information. Every field the text does not state must be null.";

/// Strict schema for the extractor's output object
pub fn extraction_schema() -> Value {
    let nullable_string = || json!({ "type": ["string", "null"] });

    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "cercoVendo": { "type": ["string", "null"], "enum": ["SEEKING", "OFFERING", null] },
            "kind": { "type": ["string", "null"], "enum": ["LODGING", "RAIL", null] },
            "title": nullable_string(),
            "location": nullable_string(),
            "checkIn": nullable_string(),
            "checkOut": nullable_string(),
            "departAt": nullable_string(),
            "arriveAt": nullable_string(),
            "returnAt": nullable_string(),
            "isNamedTicket": { "type": ["boolean", "null"] },
            "travelerGender": { "type": ["string", "null"], "enum": ["M", "F", null] },
            "bookingReference": nullable_string(),
            "price": nullable_string()
        },
        "required": [
            "cercoVendo",
            "kind",
            "title",
            "location",
            "checkIn",
            "checkOut",
            "departAt",
            "arriveAt",
            "returnAt",
            "isNamedTicket",
            "travelerGender",
            "bookingReference",
            "price"
        ]
    })
}

/// User message for an extraction call. The free text is JSON-quoted so
/// quotes or braces in the ad cannot break out of the message.
pub fn extraction_user_message(free_text: &str, locale: &str) -> String {
    let quoted = Value::String(free_text.to_string()).to_string();
    format!("Locale: {}\nAd text: {}", locale, quoted)
}

pub const SCORING_SYSTEM_PROMPT: &str = "\
You rate how well travel listings fit a user.
You receive a JSON object with the user's preferences and a list of listings.
Return ONLY a JSON array with one object per listing: {\"id\": string, \"score\": integer 0-100, \"bidirectional\": boolean}.
Use exactly the ids you were given. bidirectional is true when the listing is also likely to want what the user offers.
No prose, no markdown.";

/// Character budgets applied to candidate fields before they are sent
#[derive(Debug, Clone, Copy)]
pub struct PromptBudgets {
    pub title_chars: usize,
    pub location_chars: usize,
    pub description_chars: usize,
}

impl Default for PromptBudgets {
    fn default() -> Self {
        Self {
            title_chars: 80,
            location_chars: 60,
            description_chars: 240,
        }
    }
}

/// Compact user projection: id and preferences only
pub fn user_projection(user: &UserProfile) -> Value {
    let prefs = &user.preferences;
    json!({
        "id": user.id,
        "preferences": {
            "kinds": prefs.kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
            "location": prefs.location,
            "maxPrice": prefs.max_price,
        }
    })
}

/// Compact candidate projection. The id is never truncated.
pub fn candidate_projection(candidate: &CandidateListing, budgets: &PromptBudgets) -> Value {
    let clip = |field: &Option<String>, max: usize| {
        field.as_deref().map(|s| truncate_chars(s, max).to_string())
    };

    json!({
        "id": candidate.id,
        "title": clip(&candidate.title, budgets.title_chars),
        "kind": candidate.kind.map(|k| k.as_str()),
        "location": clip(&candidate.location, budgets.location_chars),
        "price": candidate.price,
        "description": clip(&candidate.description, budgets.description_chars),
    })
}

pub fn scoring_user_message(
    user: &UserProfile,
    batch: &[CandidateListing],
    budgets: &PromptBudgets,
) -> String {
    let payload = json!({
        "user": user_projection(user),
        "listings": batch
            .iter()
            .map(|c| candidate_projection(c, budgets))
            .collect::<Vec<_>>(),
    });
    payload.to_string()
}
