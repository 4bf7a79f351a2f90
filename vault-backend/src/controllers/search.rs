use actix_web::{web, HttpResponse};

use crate::errors::VaultResult;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/search").route("/all-notes-content", web::get().to(all_notes_content)),
    );
}

/// Flattened text of every note, for building a client-side search index
async fn all_notes_content(state: web::Data<AppState>) -> VaultResult<HttpResponse> {
    let records = state.session.store()?.search_corpus().await?;
    log::debug!("[Search] Serving {} notes for indexing", records.len());
    Ok(HttpResponse::Ok().json(records))
}
