use serde::Serialize;
use serde_json::Value;

/// Decoded body of a successful signing-service response. JSON when the
/// server declares a JSON content type, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    Text(String),
}

impl ApiResponse {
    /// Non-empty string field of a JSON object response.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self {
            ApiResponse::Json(v) => v.get(name).and_then(Value::as_str).filter(|s| !s.is_empty()),
            ApiResponse::Text(_) => None,
        }
    }

    pub fn to_pretty_string(&self) -> String {
        match self {
            ApiResponse::Json(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
            ApiResponse::Text(t) => t.clone(),
        }
    }
}

/// Result of the upload presign call, with the bucket derived from `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignedUpload {
    pub url: String,
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Serialize)]
pub struct AssetRef<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignRequest<'a> {
    pub asset: AssetRef<'a>,
    pub mode: &'a str,
    pub manifest_json: &'a str,
}

/// Signing mode: the service measures the uploaded asset itself.
pub const SIGN_MODE_SERVER_MEASURE: &str = "server_measure";

/// Where the signed artifact can be fetched and the name to offer for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReady {
    pub url: String,
    pub suggested_file_name: String,
}

/// Manifest text that has been checked to be well-formed JSON. The content
/// is never interpreted, only forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPayload(String);

impl ManifestPayload {
    pub(crate) fn new_unchecked(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: uuid::Uuid,
    pub source_name: String,
    pub saved_name: String,
    pub uploaded_bytes: usize,
    pub uploaded_sha256: String,
    pub signed_bytes: usize,
    pub signed_sha256: String,
    pub signed_asset_uri: String,
}
