use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use travel_match::config::Settings;
use travel_match::core::{AiScorer, Extractor, HeuristicScorer, Matcher};
use travel_match::routes::{self, handle_json_payload_error, AppState};
use travel_match::services::{CompletionClient, LlmError, OpenAiClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();

    // Initialize logging; LOG_LEVEL / LOG_FORMAT win over the config file
    let logging = loaded
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Travel Match service...");

    let settings = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    // Language-model client (optional - the heuristic scorer covers its absence)
    let client: Option<Arc<dyn CompletionClient>> = match OpenAiClient::from_settings(&settings.llm) {
        Ok(client) => {
            info!("Language model client initialized ({}, model {})", client.base_url(), settings.llm.model);
            Some(Arc::new(client) as Arc<dyn CompletionClient>)
        }
        Err(LlmError::MissingCredentials) => {
            warn!("No language model API key configured, AI extraction and scoring disabled");
            None
        }
        Err(e) => {
            error!("Failed to create language model client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let extractor = Arc::new(Extractor::new(client.clone(), settings.extractor_config()));
    let ai_scorer = Arc::new(AiScorer::new(client, settings.ai_scorer_config()));
    let weights = settings.heuristic_weights();
    let matcher = Matcher::new(ai_scorer, HeuristicScorer::new(weights));

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        matcher,
        extractor,
        max_input_chars: settings.extraction.max_input_chars,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
