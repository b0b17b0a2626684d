use crate::error::{Result, SignerError};
use crate::models::ManifestPayload;
use serde::de::IgnoredAny;

/// Manifest used when the operator leaves the field blank
pub const EMPTY_MANIFEST: &str = "{}";

/// Checks that the manifest text is well-formed JSON.
/// Surrounding whitespace is trimmed and blank input becomes `{}`.
pub fn validate_manifest(text: &str) -> Result<ManifestPayload> {
    let trimmed = text.trim();
    let manifest = if trimmed.is_empty() {
        EMPTY_MANIFEST
    } else {
        trimmed
    };

    serde_json::from_str::<IgnoredAny>(manifest)
        .map_err(|e| SignerError::Validation(format!("Manifest is not valid JSON: {}", e)))?;

    Ok(ManifestPayload::new_unchecked(manifest.to_string()))
}
