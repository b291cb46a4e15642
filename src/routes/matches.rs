use actix_web::{web, HttpResponse, Responder};
use serde_json::Value;

use crate::models::{HealthResponse, ScoreMatchesRequest, ScoreMatchesResponse};
use crate::routes::{ApiError, AppState};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches", web::post().to(score_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        ai_enabled: state.matcher.ai_enabled(),
    })
}

/// Score listings endpoint
///
/// POST /api/v1/matches
///
/// Request body:
/// ```json
/// {
///   "user": { "id": "string", "preferences": { "kinds": ["RAIL"], "location": "string", "maxPrice": 100 } },
///   "listings": [{ "id": "string", "title": "string", "kind": "LODGING", "location": "string", "price": 80, "description": "string" }]
/// }
/// ```
async fn score_matches(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let request_id = uuid::Uuid::new_v4();

    let request = ScoreMatchesRequest::from_value(body.into_inner()).map_err(|e| {
        tracing::info!(%request_id, error = %e, "Rejected match request");
        ApiError::bad_request(e.to_string())
    })?;

    tracing::info!(
        %request_id,
        user_id = %request.user.id,
        listings = request.listings.len(),
        "Scoring listings"
    );

    let outcome = state
        .matcher
        .find_matches(&request.user, &request.listings)
        .await;

    tracing::info!(
        %request_id,
        source = outcome.source.as_str(),
        matches = outcome.matches.len(),
        "Returning matches"
    );

    Ok(HttpResponse::Ok().json(ScoreMatchesResponse::from_results(
        outcome.matches,
        &request.listings,
    )))
}
