use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::canonical::truncate_chars;
use crate::models::ExtractListingRequest;
use crate::routes::{ApiError, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/listings/extract", web::post().to(extract_listing));
}

/// Extract a listing draft from free text
///
/// POST /api/v1/listings/extract
///
/// Request body:
/// ```json
/// { "text": "Vendo biglietto Frecciarossa Milano-Roma 12/05 ore 9:00, 45€", "locale": "it" }
/// ```
///
/// Model failures never surface here: the response is the empty draft.
async fn extract_listing(
    state: web::Data<AppState>,
    req: web::Json<ExtractListingRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for extract request: field_errors={:?}", errors);
        return Err(ApiError::bad_request(errors.to_string()));
    }

    let text = truncate_chars(&req.text, state.max_input_chars);
    tracing::info!(chars = text.chars().count(), locale = %req.locale, "Extracting listing draft");

    let draft = state.extractor.extract(text, &req.locale).await;

    Ok(HttpResponse::Ok().json(draft))
}
