use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::config::ProcessingConfig;
use crate::error::{ParentAiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Pdf,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .as_deref()
        {
            Some("pdf") => Self::Pdf,
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::PlainText,
        }
    }
}

/// The reference document as read from disk.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ParentAiError::Retrieval(format!(
                "Failed to read reference document {}: {e}",
                path.display()
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            format: DocumentFormat::from_path(path),
            bytes,
        })
    }

    /// Extracted plain text. Markdown is passed through unchanged.
    pub fn text(&self) -> Result<String> {
        match self.format {
            DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(&self.bytes)
                .map_err(|e| ParentAiError::Retrieval(format!("PDF extraction failed: {e}"))),
            DocumentFormat::PlainText | DocumentFormat::Markdown => {
                String::from_utf8(self.bytes.clone()).map_err(|e| {
                    ParentAiError::Retrieval(format!(
                        "{} is not valid UTF-8: {e}",
                        self.path.display()
                    ))
                })
            }
        }
    }

    pub fn fingerprint(&self, processing: &ProcessingConfig, model_id: &str) -> String {
        fingerprint(&self.bytes, processing, model_id)
    }
}

/// SHA-256 over the document bytes, chunking parameters and embedding model.
///
/// Any change to one of these invalidates the cached corpus.
pub fn fingerprint(bytes: &[u8], processing: &ProcessingConfig, model_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.update(b"\0chunk_size=");
    hasher.update(processing.chunk_size.to_le_bytes());
    hasher.update(b"\0chunk_overlap=");
    hasher.update(processing.chunk_overlap.to_le_bytes());
    hasher.update(b"\0model=");
    hasher.update(model_id.as_bytes());
    format!("{:x}", hasher.finalize())
}
