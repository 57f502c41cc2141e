//! Datasheet images: base64 cells keyed by "<unit> (<page>)".

use std::fmt;

use base64::{engine::general_purpose, Engine as _};

use crate::data::tables::Tables;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasheetImage {
    pub key: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub struct ImageError {
    pub key: String,
    pub source: base64::DecodeError,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image '{}' is not valid base64: {}", self.key, self.source)
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

pub fn image_key(unit: &str, page: u32) -> String {
    format!("{unit} ({page})")
}

pub fn decode_image(key: &str, encoded: &str) -> Result<DatasheetImage, ImageError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = general_purpose::STANDARD
        .decode(compact)
        .map_err(|source| ImageError {
            key: key.to_string(),
            source,
        })?;
    Ok(DatasheetImage {
        key: key.to_string(),
        content_type: sniff_content_type(&bytes),
        bytes,
    })
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

/// Page `page` of a unit's datasheet. `Ok(None)` when no such image exists.
pub fn datasheet_image(
    tables: &Tables,
    unit: &str,
    page: u32,
) -> Result<Option<DatasheetImage>, ImageError> {
    let key = image_key(unit, page);
    match tables.images.iter().find(|img| img.name == key) {
        Some(record) => decode_image(&key, &record.encoded).map(Some),
        None => Ok(None),
    }
}
