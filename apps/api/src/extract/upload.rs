use std::collections::HashMap;

use axum::extract::Multipart;

use crate::errors::AppError;
use crate::extract::{validate_upload_name, UploadedDocument};

/// All parts of a multipart request, keyed by field name.
///
/// File parts keep their filename; plain form fields have none. A repeated
/// field name keeps the last part.
#[derive(Debug, Default)]
pub struct UploadForm {
    parts: HashMap<String, UploadedDocument>,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut parts = HashMap::new();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let filename = field
                .file_name()
                .map(str::to_string)
                .filter(|f| !f.trim().is_empty());
            if let Some(filename) = &filename {
                validate_upload_name(filename)?;
            }
            let bytes = field.bytes().await?;
            parts.insert(name, UploadedDocument { filename, bytes });
        }

        Ok(Self { parts })
    }

    /// Removes and returns a required part, file or text.
    pub fn take_document(&mut self, name: &str) -> Result<UploadedDocument, AppError> {
        self.parts
            .remove(name)
            .filter(|doc| !doc.bytes.is_empty())
            .ok_or_else(|| AppError::Validation(format!("Missing upload field '{name}'")))
    }

    /// A plain form value, trimmed. Empty values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.parts
            .get(name)
            .map(|doc| String::from_utf8_lossy(&doc.bytes).trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
