use crate::config::ApiConfig;
use crate::error::{Result, SignerError};
use crate::models::{
    ApiResponse, AssetRef, PresignedUpload, SIGN_MODE_SERVER_MEASURE, SignRequest,
};
use crate::utils::content_type::DEFAULT_CONTENT_TYPE;
use crate::utils::s3_url::bucket_from_presigned_url;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::json;

pub const API_KEY_HEADER: &str = "x-api-key";

pub const PRESIGN_UPLOAD_PATH: &str = "/v1/assets/presign";
pub const SIGN_PATH: &str = "/v1/sign";
pub const PRESIGN_DOWNLOAD_PATH: &str = "/v1/assets/presign-download";

/// Longest slice of an error body kept in [`SignerError::Http`]
pub const MAX_ERROR_BODY_CHARS: usize = 1000;

/// Operations against the signing service and the object store it hands out
/// presigned URLs for. Every call has remote side effects.
#[async_trait]
pub trait SigningApi: Send + Sync {
    /// Requests a presigned upload URL. The bucket is derived from the URL.
    async fn presign_upload(&self) -> Result<PresignedUpload>;

    /// PUTs raw bytes to a presigned URL.
    async fn upload_to_s3_put(&self, url: &str, bytes: Bytes, content_type: &str) -> Result<()>;

    /// Asks the service to sign an uploaded asset. The response is returned as-is.
    async fn sign_asset(&self, bucket: &str, key: &str, manifest_json: &str)
    -> Result<ApiResponse>;

    /// Requests a presigned download URL for a signed asset.
    async fn presign_download(&self, bucket: &str, key: &str) -> Result<ApiResponse>;

    /// GETs the bytes behind a presigned download URL.
    async fn download_from_s3(&self, url: &str) -> Result<Bytes>;
}

/// HTTP implementation of [`SigningApi`] on top of reqwest.
pub struct SigningClient {
    http: Client,
    config: ApiConfig,
}

impl SigningClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http_client(config, builder.build()?))
    }

    /// Uses a preconfigured reqwest client, e.g. one with DNS overrides.
    pub fn with_http_client(config: ApiConfig, http: Client) -> Self {
        Self { http, config }
    }

    async fn request<B>(&self, path: &str, body: Option<&B>) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        tracing::debug!("POST {}", url);

        let mut req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.essence_str())
            .header(API_KEY_HEADER, &self.config.api_key);

        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| SignerError::Decode(format!("Failed to encode request: {}", e)))?;
            req = req.body(payload);
        }

        let res = req.send().await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await?;
            tracing::warn!("{} returned {}", path, status);
            return Err(SignerError::Http {
                status: status.as_u16(),
                status_text: status_text(status),
                body: truncate_chars(&text, MAX_ERROR_BODY_CHARS),
            });
        }

        decode_response(res).await
    }
}

#[async_trait]
impl SigningApi for SigningClient {
    async fn presign_upload(&self) -> Result<PresignedUpload> {
        let resp = self.request::<()>(PRESIGN_UPLOAD_PATH, None).await?;

        let url = resp
            .str_field("url")
            .ok_or_else(|| SignerError::MissingField("url".to_string()))?;
        let key = resp
            .str_field("key")
            .ok_or_else(|| SignerError::MissingField("key".to_string()))?;
        let bucket = bucket_from_presigned_url(url)?;

        Ok(PresignedUpload {
            url: url.to_string(),
            key: key.to_string(),
            bucket,
        })
    }

    async fn upload_to_s3_put(&self, url: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        let content_type = if content_type.is_empty() {
            DEFAULT_CONTENT_TYPE
        } else {
            content_type
        };

        tracing::debug!("PUT {} bytes ({})", bytes.len(), content_type);
        let res = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await?;
            tracing::error!("S3 PUT failed with status {}", status);
            return Err(SignerError::Upload {
                status: status.as_u16(),
                status_text: status_text(status),
                body,
            });
        }
        Ok(())
    }

    async fn sign_asset(
        &self,
        bucket: &str,
        key: &str,
        manifest_json: &str,
    ) -> Result<ApiResponse> {
        let payload = SignRequest {
            asset: AssetRef { bucket, key },
            mode: SIGN_MODE_SERVER_MEASURE,
            manifest_json,
        };
        self.request(SIGN_PATH, Some(&payload)).await
    }

    async fn presign_download(&self, bucket: &str, key: &str) -> Result<ApiResponse> {
        let payload = json!({ "bucket": bucket, "key": key });
        self.request(PRESIGN_DOWNLOAD_PATH, Some(&payload)).await
    }

    async fn download_from_s3(&self, url: &str) -> Result<Bytes> {
        let res = self.http.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(SignerError::Download {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }
        Ok(res.bytes().await?)
    }
}

async fn decode_response(res: Response) -> Result<ApiResponse> {
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    let text = res.text().await?;
    if is_json {
        let value = serde_json::from_str(&text)
            .map_err(|e| SignerError::Decode(format!("Invalid JSON response: {}", e)))?;
        Ok(ApiResponse::Json(value))
    } else {
        Ok(ApiResponse::Text(text))
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| {
            m.type_() == mime::APPLICATION
                && (m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
        })
        .unwrap_or(false)
}

fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
