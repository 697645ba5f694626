//! Document sources feeding the ingestion pipeline
//!
//! Conversion of PDFs, office files and HTML into Markdown happens upstream;
//! a source only hands over text that is already normalized.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::types::Document;

/// Directories never descended into
const SKIP_DIRS: &[&str] = &[".git", ".venv", "__pycache__", "node_modules", "site-packages"];

/// Extensions read as normalized Markdown
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Extensions expected in raw folders but handled by the converter, skipped quietly
const QUIET_SKIP_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "pdf"];

/// Supplies normalized Markdown documents for one ingestion run
pub trait DocumentSource {
    /// All documents of the run in a stable order
    ///
    /// The outer error aborts the run; an inner error only skips that document.
    fn documents(&self) -> Result<Vec<Result<Document>>>;
}

impl DocumentSource for Vec<Document> {
    fn documents(&self) -> Result<Vec<Result<Document>>> {
        Ok(self.iter().cloned().map(Ok).collect())
    }
}

/// Reads `.md` and `.txt` files below a raw directory
#[derive(Debug, Clone)]
pub struct FsDocumentSource {
    root: PathBuf,
}

impl FsDocumentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stable relative path with `/` separators
    fn source_id(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn read_document(&self, path: &Path) -> Option<Result<Document>> {
        let source_id = self.source_id(path);
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if QUIET_SKIP_EXTENSIONS.contains(&ext.as_str()) {
            tracing::debug!("Skipping {} (converted upstream)", source_id);
            return None;
        }

        if !TEXT_EXTENSIONS.contains(&ext.as_str()) {
            return Some(Err(Error::unsupported(
                source_id,
                format!("unsupported extension '{}'", ext),
            )));
        }

        Some(
            std::fs::read(path)
                .map(|bytes| Document::new(source_id.clone(), String::from_utf8_lossy(&bytes)))
                .map_err(|e| Error::unsupported(source_id, format!("unreadable: {}", e))),
        )
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && entry.depth() > 0 && SKIP_DIRS.iter().any(|d| *d == name)
}

impl DocumentSource for FsDocumentSource {
    fn documents(&self) -> Result<Vec<Result<Document>>> {
        if !self.root.is_dir() {
            return Err(Error::config(format!(
                "Raw document directory does not exist: {}",
                self.root.display()
            )));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(doc) = self.read_document(entry.path()) {
                documents.push(doc);
            }
        }

        Ok(documents)
    }
}
