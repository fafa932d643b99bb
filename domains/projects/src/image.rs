//! Cover image codec port
//!
//! Validates uploaded cover images before they are attached to a project.
//! Recompression strategies are a collaborator concern; the default codec
//! validates name, extension and size and passes the bytes through.

use fundline_common::{Error, Result};

/// Allowed cover image extensions
pub const VALID_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "jfif", "webp"];

/// Maximum accepted file size (3 MiB)
pub const MAX_FILE_SIZE: usize = 3 * 1024 * 1024;

/// Validates and prepares an uploaded image for storage
pub trait ImageCodec: Send + Sync {
    /// Check the upload and return the bytes to persist
    fn validate_and_compress(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Default codec: extension and size validation, pass-through bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionImageCodec;

impl ImageCodec for ExtensionImageCodec {
    fn validate_and_compress(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<u8>> {
        if bytes.is_empty() {
            return Err(Error::InvalidParameters("invalid file".to_string()));
        }

        if bytes.len() > MAX_FILE_SIZE {
            return Err(Error::InvalidParameters(
                "the file is too large".to_string(),
            ));
        }

        let extension = match file_name.rfind('.') {
            Some(index) if index > 0 => file_name[index + 1..].to_lowercase(),
            _ => {
                return Err(Error::InvalidParameters("invalid file name".to_string()));
            }
        };

        if !VALID_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::InvalidParameters(
                "invalid file extension".to_string(),
            ));
        }

        Ok(bytes.to_vec())
    }
}
