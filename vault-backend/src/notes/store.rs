//! VaultStore: CRUD over the notes of one bound directory
//!
//! A store is a cheap handle on a root path. It holds no state of its own,
//! so a request that obtained a store before a rebind finishes against the
//! directory it started with.

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tokio::fs;

use super::decompose::{decompose, DecomposedNote};
use super::file_ops;
use super::search_text::build_search_text;
use crate::errors::{VaultError, VaultResult};

/// One entry of the search corpus handed to the client-side index
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub name: String,
    /// Combined searchable text (frontmatter strings, body, graph labels)
    pub content: String,
    pub processed_tags: Vec<String>,
    /// Unix epoch milliseconds
    pub modified_time: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All note filenames in the vault, sorted
    pub async fn list(&self) -> VaultResult<Vec<String>> {
        Ok(file_ops::list_notes(&self.root).await?)
    }

    /// Read and decompose a note
    pub async fn read(&self, id: &str) -> VaultResult<DecomposedNote> {
        file_ops::validate_read_id(id)?;
        let path = self.root.join(id);

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(VaultError::NotFound("Note not found".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !metadata.is_file() {
            return Err(VaultError::InvalidTarget("Requested path is not a file".to_string()));
        }

        let raw = file_ops::read_note(&path).await?;
        Ok(decompose(id, &raw))
    }

    /// Save a note verbatim, creating it if needed
    pub async fn write(&self, id: &str, content: &str) -> VaultResult<()> {
        file_ops::validate_note_id(id)?;
        let path = self.root.join(id);
        file_ops::write_note(&path, content).await?;
        log::info!("[Vault] Note saved: {}", path.display());
        Ok(())
    }

    /// Create a new note seeded with a heading; refuses to overwrite
    pub async fn create(&self, id: &str) -> VaultResult<()> {
        file_ops::validate_note_id(id)?;
        let path = self.root.join(id);

        match file_ops::create_note(&path, &file_ops::seed_content(id)).await {
            Ok(()) => {
                log::info!("[Vault] Note created: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(VaultError::Conflict(
                format!("Note '{}' already exists", id),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Decompose every note and flatten it for the client-side search index
    pub async fn search_corpus(&self) -> VaultResult<Vec<SearchRecord>> {
        let names = self.list().await?;
        let mut records = Vec::with_capacity(names.len());

        for name in names {
            let path = self.root.join(&name);
            let (raw, metadata) = match tokio::try_join!(file_ops::read_note(&path), fs::metadata(&path)) {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("[Vault] Skipping {} in search corpus: {}", name, e);
                    continue;
                }
            };

            let note = decompose(&name, &raw);
            let search = build_search_text(&note);
            records.push(SearchRecord {
                name,
                content: search.text,
                processed_tags: search.tags,
                modified_time: file_ops::modified_millis(&metadata),
            });
        }

        Ok(records)
    }
}
