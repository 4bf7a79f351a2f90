use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::errors::{VaultError, VaultResult};
use crate::AppState;

#[derive(Deserialize)]
pub struct SetPathRequest {
    pub path: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/vault")
            .route("/set-path", web::post().to(set_path))
            .route("/status", web::get().to(status)),
    );
}

async fn set_path(
    state: web::Data<AppState>,
    body: web::Json<SetPathRequest>,
) -> VaultResult<HttpResponse> {
    let path = body
        .into_inner()
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| VaultError::validation("Path is required"))?;

    let binding = state.session.bind(&path).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Vault path set to: {}. Watching for changes.", binding.path().display()),
        "path": binding.path().display().to_string(),
        "watching": binding.is_watching()
    })))
}

async fn status(state: web::Data<AppState>) -> HttpResponse {
    match state.session.current() {
        Some(binding) => HttpResponse::Ok().json(serde_json::json!({
            "bound": true,
            "path": binding.path().display().to_string(),
            "watching": binding.is_watching()
        })),
        None => HttpResponse::Ok().json(serde_json::json!({
            "bound": false,
            "path": null,
            "watching": false
        })),
    }
}
