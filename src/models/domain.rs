use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::lenient;

/// Listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingKind {
    #[serde(rename = "LODGING", alias = "lodging", alias = "hotel", alias = "HOTEL")]
    Lodging,
    #[serde(rename = "RAIL", alias = "rail", alias = "train", alias = "TRAIN")]
    Rail,
}

impl ListingKind {
    /// Lenient token parse used for model output and caller payloads
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "lodging" | "hotel" | "albergo" => Some(ListingKind::Lodging),
            "rail" | "train" | "treno" => Some(ListingKind::Rail),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Lodging => "LODGING",
            ListingKind::Rail => "RAIL",
        }
    }
}

/// Direction of an ad: the poster is looking for something or selling it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "SEEKING")]
    Seeking,
    #[serde(rename = "OFFERING")]
    Offering,
}

impl Direction {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "seeking" | "cerco" | "seek" | "wanted" => Some(Direction::Seeking),
            "offering" | "vendo" | "offer" | "selling" => Some(Direction::Offering),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "M" | "MALE" => Some(Gender::M),
            "F" | "FEMALE" => Some(Gender::F),
            _ => None,
        }
    }
}

/// Canonical listing record produced by the description extractor.
///
/// Text fields use `""` as their empty value, enums and booleans use `None`
/// (serialized as `null`). `returnAt` is the only key that may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingDraft {
    #[serde(rename = "cercoVendo")]
    pub direction: Option<Direction>,
    pub kind: Option<ListingKind>,
    pub title: String,
    pub location: String,
    #[serde(rename = "checkIn")]
    pub check_in: String,
    #[serde(rename = "checkOut")]
    pub check_out: String,
    #[serde(rename = "departAt")]
    pub depart_at: String,
    #[serde(rename = "arriveAt")]
    pub arrive_at: String,
    #[serde(rename = "returnAt", default, skip_serializing_if = "Option::is_none")]
    pub return_at: Option<String>,
    #[serde(rename = "isNamedTicket")]
    pub is_named_ticket: Option<bool>,
    #[serde(rename = "travelerGender")]
    pub traveler_gender: Option<Gender>,
    #[serde(rename = "bookingReference")]
    pub booking_reference: String,
    pub price: String,
}

impl ListingDraft {
    /// The all-empty draft every extraction starts from
    pub const fn empty() -> Self {
        Self {
            direction: None,
            kind: None,
            title: String::new(),
            location: String::new(),
            check_in: String::new(),
            check_out: String::new(),
            depart_at: String::new(),
            arrive_at: String::new(),
            return_at: None,
            is_named_ticket: None,
            traveler_gender: None,
            booking_reference: String::new(),
            price: String::new(),
        }
    }

    /// Blank out every field that belongs to the other listing kind
    pub fn suppress_out_of_kind(&mut self) {
        match self.kind {
            Some(ListingKind::Lodging) => {
                self.depart_at.clear();
                self.arrive_at.clear();
                self.return_at = None;
                self.is_named_ticket = None;
                self.traveler_gender = None;
                self.booking_reference.clear();
            }
            Some(ListingKind::Rail) => {
                self.check_in.clear();
                self.check_out.clear();
            }
            None => {}
        }

        if self.is_named_ticket != Some(true) {
            self.traveler_gender = None;
        }
    }
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self::empty()
    }
}

/// A listing offered to the scorers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateListing {
    #[serde(deserialize_with = "lenient::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub title: Option<String>,
    #[serde(default, alias = "type", deserialize_with = "lenient::optional_kind")]
    pub kind: Option<ListingKind>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_price")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
}

impl CandidateListing {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            kind: None,
            location: None,
            price: None,
            description: None,
        }
    }
}

/// The scoring side of a user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Only used for logs and the prompt projection
    #[serde(default, deserialize_with = "lenient::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default, deserialize_with = "lenient::kind_list")]
    pub kinds: Vec<ListingKind>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub location: Option<String>,
    #[serde(
        rename = "maxPrice",
        alias = "max_price",
        default,
        deserialize_with = "lenient::optional_price"
    )]
    pub max_price: Option<f64>,
}

/// Compatibility score for one candidate listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: String,
    pub score: u8,
    pub bidirectional: bool,
}

impl MatchResult {
    pub fn new(id: impl Into<String>, score: u8, bidirectional: bool) -> Self {
        Self {
            id: id.into(),
            score,
            bidirectional,
        }
    }

    /// Placeholder for a candidate the model never scored
    pub fn unscored(id: impl Into<String>) -> Self {
        Self::new(id, 0, false)
    }
}

/// Heuristic scorer weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicWeights {
    pub base: f64,
    pub kind_bonus: f64,
    pub price_bonus: f64,
    pub location_bonus: f64,
    pub bidirectional_threshold: f64,
}

pub const DEFAULT_BASE_SCORE: f64 = 60.0;
pub const DEFAULT_KIND_BONUS: f64 = 15.0;
pub const DEFAULT_PRICE_BONUS: f64 = 10.0;
pub const DEFAULT_LOCATION_BONUS: f64 = 10.0;
pub const DEFAULT_BIDIRECTIONAL_THRESHOLD: f64 = 80.0;

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_SCORE,
            kind_bonus: DEFAULT_KIND_BONUS,
            price_bonus: DEFAULT_PRICE_BONUS,
            location_bonus: DEFAULT_LOCATION_BONUS,
            bidirectional_threshold: DEFAULT_BIDIRECTIONAL_THRESHOLD,
        }
    }
}

/// Canonical result ordering: score descending, then id ascending
pub fn canonical_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}

pub fn sort_canonical(results: &mut [MatchResult]) {
    results.sort_by(canonical_order);
}
