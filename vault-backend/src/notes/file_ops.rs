//! File operations for the vault
//!
//! Identifier checks, directory listing, and the raw read/write primitives
//! the store is built on. Note ids are bare filenames in a flat namespace.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::decompose::{classify, MARKDOWN_EXT};
use crate::errors::{VaultError, VaultResult};

/// True if `id` is a single path segment that cannot escape the vault root
pub fn is_safe_segment(id: &str) -> bool {
    !id.is_empty()
        && !id.contains('/')
        && !id.contains('\\')
        && !id.contains("..")
        && !id.contains('\0')
}

/// Ids accepted for reading: any safe single segment
pub fn validate_read_id(id: &str) -> VaultResult<()> {
    if is_safe_segment(id) {
        Ok(())
    } else {
        Err(VaultError::validation("Invalid note name"))
    }
}

/// Ids accepted for writing or creating: safe single segment ending in `.md`.
/// Dotfiles are refused since listing and the watcher never show them.
pub fn validate_note_id(id: &str) -> VaultResult<()> {
    if is_safe_segment(id) && id.ends_with(MARKDOWN_EXT) && !id.starts_with('.') {
        Ok(())
    } else {
        Err(VaultError::validation(
            "Invalid note name format. Must end with .md and not contain path traversals.",
        ))
    }
}

/// Starting text for a freshly created note, e.g. `"# ideas\n\n"` for `ideas.md`
pub fn seed_content(id: &str) -> String {
    let title = id.strip_suffix(MARKDOWN_EXT).unwrap_or(id);
    format!("# {}\n\n", title)
}

/// List note filenames directly inside `dir` (no recursion), sorted.
/// Dotfiles, directories, and non-note extensions are skipped.
pub async fn list_notes(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        let name = match entry.file_name().to_str() {
            Some(n) => n.to_string(),
            None => continue,
        };

        if name.starts_with('.') || classify(&name).is_none() {
            continue;
        }

        // Follows symlinks, so a linked note still counts as a file
        match fs::metadata(entry.path()).await {
            Ok(m) if m.is_file() => names.push(name),
            Ok(_) => {}
            Err(e) => log::debug!("Skipping {}: {}", name, e),
        }
    }

    names.sort();
    Ok(names)
}

/// Read a note as text; invalid UTF-8 is replaced rather than rejected
pub async fn read_note(path: &Path) -> io::Result<String> {
    let raw = fs::read(path).await?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Write a note, creating or truncating it
pub async fn write_note(path: &Path, content: &str) -> io::Result<()> {
    fs::write(path, content).await
}

/// Create a note that must not exist yet. Fails with `AlreadyExists`
/// otherwise, without touching the existing file.
pub async fn create_note(path: &Path, content: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Modification time as Unix epoch milliseconds
pub fn modified_millis(metadata: &Metadata) -> Option<i64> {
    metadata.modified().ok().map(|t| {
        let datetime: DateTime<Utc> = t.into();
        datetime.timestamp_millis()
    })
}
