use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::core::{ai_scorer::DEFAULT_BATCH_SIZE, extractor::MIN_TITLE_CHARS, prompt::PromptBudgets};
use crate::core::{AiScorerConfig, ExtractorConfig};
use crate::models::HeuristicWeights;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub extraction: ExtractionSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Language-model service settings. An empty `api_key` disables every AI
/// feature; the service then runs on the heuristic scorer alone.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_extraction_temperature")]
    pub extraction_temperature: f32,
    #[serde(default = "default_scoring_temperature")]
    pub scoring_temperature: f32,
    /// Soft timeout raced against each model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Hard timeout on the underlying HTTP request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            extraction_temperature: default_extraction_temperature(),
            scoring_temperature: default_scoring_temperature(),
            timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_extraction_temperature() -> f32 { 0.1 }
fn default_scoring_temperature() -> f32 { 0.2 }
fn default_timeout_secs() -> u64 { 25 }
fn default_request_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionSettings {
    #[serde(default = "default_min_title_chars")]
    pub min_title_chars: usize,
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_title_chars: default_min_title_chars(),
            max_input_chars: default_max_input_chars(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_min_title_chars() -> usize { MIN_TITLE_CHARS }
fn default_max_input_chars() -> usize { 4000 }
fn default_currency_symbol() -> String { "€".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_title_chars")]
    pub title_chars: usize,
    #[serde(default = "default_location_chars")]
    pub location_chars: usize,
    #[serde(default = "default_description_chars")]
    pub description_chars: usize,
    #[serde(default)]
    pub weights: WeightsConfig,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            title_chars: default_title_chars(),
            location_chars: default_location_chars(),
            description_chars: default_description_chars(),
            weights: WeightsConfig::default(),
        }
    }
}

fn default_batch_size() -> usize { DEFAULT_BATCH_SIZE }
fn default_title_chars() -> usize { PromptBudgets::default().title_chars }
fn default_location_chars() -> usize { PromptBudgets::default().location_chars }
fn default_description_chars() -> usize { PromptBudgets::default().description_chars }

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_base")]
    pub base: f64,
    #[serde(default = "default_kind_bonus")]
    pub kind_bonus: f64,
    #[serde(default = "default_price_bonus")]
    pub price_bonus: f64,
    #[serde(default = "default_location_bonus")]
    pub location_bonus: f64,
    #[serde(default = "default_bidirectional_threshold")]
    pub bidirectional_threshold: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            kind_bonus: default_kind_bonus(),
            price_bonus: default_price_bonus(),
            location_bonus: default_location_bonus(),
            bidirectional_threshold: default_bidirectional_threshold(),
        }
    }
}

fn default_base() -> f64 { HeuristicWeights::default().base }
fn default_kind_bonus() -> f64 { HeuristicWeights::default().kind_bonus }
fn default_price_bonus() -> f64 { HeuristicWeights::default().price_bonus }
fn default_location_bonus() -> f64 { HeuristicWeights::default().location_bonus }
fn default_bidirectional_threshold() -> f64 { HeuristicWeights::default().bidirectional_threshold }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with TRAVEL_MATCH__)
    /// 5. OPENAI_API_KEY, when set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., TRAVEL_MATCH__LLM__MODEL -> llm.model
            .add_source(
                Environment::with_prefix("TRAVEL_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            model: self.llm.model.clone(),
            temperature: self.llm.extraction_temperature,
            timeout: Duration::from_secs(self.llm.timeout_secs),
            min_title_chars: self.extraction.min_title_chars,
            currency_symbol: self.extraction.currency_symbol.clone(),
        }
    }

    pub fn ai_scorer_config(&self) -> AiScorerConfig {
        AiScorerConfig {
            model: self.llm.model.clone(),
            temperature: self.llm.scoring_temperature,
            batch_size: self.scoring.batch_size,
            timeout: Duration::from_secs(self.llm.timeout_secs),
            budgets: PromptBudgets {
                title_chars: self.scoring.title_chars,
                location_chars: self.scoring.location_chars,
                description_chars: self.scoring.description_chars,
            },
        }
    }

    pub fn heuristic_weights(&self) -> HeuristicWeights {
        let weights = &self.scoring.weights;
        HeuristicWeights {
            base: weights.base,
            kind_bonus: weights.kind_bonus,
            price_bonus: weights.price_bonus,
            location_bonus: weights.location_bonus,
            bidirectional_threshold: weights.bidirectional_threshold,
        }
    }
}

/// The conventional OPENAI_API_KEY variable wins over the prefixed one
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
        if !api_key.trim().is_empty() {
            builder = builder.set_override("llm.api_key", api_key)?;
        }
    }

    builder.build()
}
