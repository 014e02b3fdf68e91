// Converts uploaded resume files to plain text.
// Only .pdf and .txt are accepted; layout is not preserved.

use tracing::debug;

use crate::extraction::ExtractError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Pdf,
    Text,
}

impl UploadFormat {
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            Ok(UploadFormat::Pdf)
        } else if lower.ends_with(".txt") {
            Ok(UploadFormat::Text)
        } else {
            Err(ExtractError::UnsupportedFormat(filename.to_string()))
        }
    }
}

/// Decodes an uploaded file into text.
pub fn decode_upload(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let text = match UploadFormat::from_filename(filename)? {
        UploadFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Unreadable(format!("{filename}: {e}")))?,
        UploadFormat::Text => decode_text(bytes),
    };
    debug!("Decoded upload {} into {} chars", filename, text.chars().count());
    Ok(text)
}

/// UTF-8, falling back to Latin-1 so any byte sequence decodes.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
