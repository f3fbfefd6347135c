//! Upload validation for receipt and signature images.
//!
//! Payloads are opaque byte blobs handed to the receipt vault; entities only
//! ever hold a [`StoredFile`] reference back to the blob.

use mime::Mime;
use serde::{Deserialize, Serialize};

/// Extensions accepted for receipts and staff signature images.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpeg", "jpg"];

/// An inbound file payload as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Reference to a blob held by the vault collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub key: String,
    pub filename: String,
}

impl StoredFile {
    /// Media type derived from the validated extension.
    pub fn media_type(&self) -> Mime {
        if extension_of(&self.filename)
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false)
        {
            mime::IMAGE_PNG
        } else {
            mime::IMAGE_JPEG
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("'{filename}' is not an accepted image; allowed extensions are png, jpeg, jpg")]
pub struct UnsupportedImage {
    pub filename: String,
}

/// Enforce the png/jpeg/jpg rule on an upload filename, case-insensitively.
pub fn validate_image_filename(filename: &str) -> Result<(), UnsupportedImage> {
    let accepted = extension_of(filename)
        .map(|ext| {
            ALLOWED_IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false);

    if accepted {
        Ok(())
    } else {
        Err(UnsupportedImage {
            filename: filename.to_string(),
        })
    }
}

fn extension_of(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
