use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::{VaultError, VaultResult};
use crate::AppState;

#[derive(Deserialize)]
pub struct SaveNoteRequest {
    /// Kept loose so a non-string gets a precise error instead of a
    /// generic deserialization failure
    pub content: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateNoteRequest {
    pub filename: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .route("", web::get().to(list_notes))
            .route("/create", web::post().to(create_note))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::post().to(save_note)),
    );
}

async fn list_notes(state: web::Data<AppState>) -> VaultResult<HttpResponse> {
    let names = state.session.store()?.list().await?;
    Ok(HttpResponse::Ok().json(names))
}

async fn get_note(state: web::Data<AppState>, path: web::Path<String>) -> VaultResult<HttpResponse> {
    let id = path.into_inner();
    let note = state.session.store()?.read(&id).await?;
    Ok(HttpResponse::Ok().json(note))
}

async fn save_note(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SaveNoteRequest>,
) -> VaultResult<HttpResponse> {
    let store = state.session.store()?;
    let id = path.into_inner();

    let content = match body.into_inner().content {
        Some(Value::String(s)) => s,
        _ => return Err(VaultError::validation("Content must be a string")),
    };

    store.write(&id, &content).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Note '{}' saved successfully.", id)
    })))
}

async fn create_note(
    state: web::Data<AppState>,
    body: web::Json<CreateNoteRequest>,
) -> VaultResult<HttpResponse> {
    let store = state.session.store()?;
    let filename = body.into_inner().filename.unwrap_or_default();

    store.create(&filename).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": format!("Note '{}' created successfully.", filename),
        "filename": filename
    })))
}
