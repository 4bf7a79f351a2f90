pub mod health;
pub mod notes;
pub mod search;
pub mod vault;

use actix_web::{error, web, HttpRequest, HttpResponse};

/// JSON extractor config: malformed bodies become `{"error": ...}` with 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request body: {}", err);
        let response = HttpResponse::BadRequest().json(serde_json::json!({ "error": message }));
        error::InternalError::from_response(err, response).into()
    })
}

/// Catch-all for unknown `/api/*` routes so they never fall through to
/// static file serving
pub fn api_fallback(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").default_service(web::to(api_not_found)));
}

async fn api_not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": format!("No route for {} {}", req.method(), req.path())
    }))
}
