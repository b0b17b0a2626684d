use crate::error::{Result, SignerError};
use crate::infrastructure::local_files::{FileHandle, FileSelector, SaveDestination};
use crate::models::{DownloadReady, ManifestPayload, PipelineReport, PresignedUpload};
use crate::services::signing_client::SigningApi;
use crate::utils::content_type::{infer_content_type, suggest_signed_name};
use crate::utils::hash::{sha256_hex, short_digest};
use crate::utils::s3_url::{S3Location, parse_s3_uri};
use crate::utils::validation::validate_manifest;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Where a pipeline run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Picked,
    Presigned,
    Uploaded,
    Signed,
    DownloadPresigned,
    SaveReady,
    Saved,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Saved | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Picked => "picked",
            Stage::Presigned => "presigned",
            Stage::Uploaded => "uploaded",
            Stage::Signed => "signed",
            Stage::DownloadPresigned => "download-presigned",
            Stage::SaveReady => "save-ready",
            Stage::Saved => "saved",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What was PUT to object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub size: usize,
    pub sha256: String,
    pub content_type: String,
}

/// Written signed artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub name: String,
    pub size: usize,
    pub sha256: String,
}

/// Data carried from one stage to the next. Scoped to a single run.
#[derive(Default)]
pub struct PipelineState {
    pub selected_file: Option<Box<dyn FileHandle>>,
    pub manifest: Option<ManifestPayload>,
    pub upload_target: Option<PresignedUpload>,
    pub upload_receipt: Option<UploadReceipt>,
    pub signed_asset: Option<S3Location>,
    pub download_ready: Option<DownloadReady>,
    pub saved: Option<SavedFile>,
}

/// Drives picked file → upload → sign → download presign → save.
///
/// Each stage is invoked explicitly. A failing stage moves the pipeline to
/// [`Stage::Failed`] and leaves completed remote work in place; start over
/// with [`Pipeline::reset`] or a new pick.
pub struct Pipeline {
    api: Arc<dyn SigningApi>,
    state: PipelineState,
    stage: Stage,
    failed_at: Option<Stage>,
    last_error: Option<String>,
    run_id: Uuid,
}

impl Pipeline {
    pub fn new(api: Arc<dyn SigningApi>) -> Self {
        Self {
            api,
            state: PipelineState::default(),
            stage: Stage::Idle,
            failed_at: None,
            last_error: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stage that was active when the pipeline failed.
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Drops all run state and returns to [`Stage::Idle`].
    pub fn reset(&mut self) {
        self.state = PipelineState::default();
        self.stage = Stage::Idle;
        self.failed_at = None;
        self.last_error = None;
        self.run_id = Uuid::new_v4();
    }

    /// Asks the selector for a file. Returns `false` when the selection was
    /// cancelled, in which case nothing changes.
    pub async fn pick(&mut self, selector: &dyn FileSelector) -> Result<bool> {
        let file = match selector.select().await {
            Ok(Some(file)) => file,
            Ok(None) => return Ok(false),
            Err(e) => return self.settle(Err(e)),
        };

        self.reset();
        info!(run_id = %self.run_id, "📂 Picked: {}", file.name());
        self.state.selected_file = Some(file);
        self.stage = Stage::Picked;
        Ok(true)
    }

    /// Validates the manifest, then presigns, reads and PUTs the picked file.
    pub async fn upload(&mut self, manifest_text: &str) -> Result<()> {
        let span = info_span!("upload", run_id = %self.run_id);
        let result = self.try_upload(manifest_text).instrument(span).await;
        self.settle(result)
    }

    async fn try_upload(&mut self, manifest_text: &str) -> Result<()> {
        let file = match (&self.stage, self.state.selected_file.as_ref()) {
            (Stage::Picked, Some(file)) => file,
            _ => return Err(SignerError::Validation("Pick a file first.".to_string())),
        };

        let manifest = validate_manifest(manifest_text)?;

        info!("🔗 Requesting presigned upload URL...");
        let target = self.api.presign_upload().await?;
        debug!("Upload target: bucket={} key={}", target.bucket, target.key);
        self.stage = Stage::Presigned;

        info!("📖 Reading local file...");
        let bytes = file.read().await?;
        let content_type = infer_content_type(file.name());
        let receipt = UploadReceipt {
            size: bytes.len(),
            sha256: sha256_hex(&bytes),
            content_type: content_type.to_string(),
        };

        info!(
            "☁️  Uploading to S3 (PUT)... {} bytes, {}, sha256 {}",
            receipt.size,
            content_type,
            short_digest(&receipt.sha256)
        );
        self.api
            .upload_to_s3_put(&target.url, Bytes::from(bytes), content_type)
            .await?;

        self.state.manifest = Some(manifest);
        self.state.upload_target = Some(target);
        self.state.upload_receipt = Some(receipt);
        self.stage = Stage::Uploaded;
        Ok(())
    }

    /// Signs the uploaded asset and records where the signed copy lives.
    pub async fn sign(&mut self) -> Result<()> {
        let span = info_span!("sign", run_id = %self.run_id);
        let result = self.try_sign().instrument(span).await;
        self.settle(result)
    }

    async fn try_sign(&mut self) -> Result<()> {
        let (target, manifest) = match (
            &self.stage,
            self.state.upload_target.as_ref(),
            self.state.manifest.as_ref(),
        ) {
            (Stage::Uploaded, Some(target), Some(manifest)) => (target, manifest),
            _ => return Err(SignerError::Validation("Upload the asset first.".to_string())),
        };

        info!("✍️  Calling /v1/sign...");
        let resp = self
            .api
            .sign_asset(&target.bucket, &target.key, manifest.as_str())
            .await?;
        debug!("Sign response: {}", resp.to_pretty_string());

        let uri = resp
            .str_field("asset_s3_uri")
            .ok_or_else(|| SignerError::MissingField("asset_s3_uri".to_string()))?;
        let location = parse_s3_uri(uri)?;
        info!("✅ Signed asset at {}", location);

        self.state.signed_asset = Some(location);
        self.stage = Stage::Signed;
        Ok(())
    }

    /// Presigns the signed asset for download and picks the name to save it under.
    pub async fn prepare_download(&mut self) -> Result<()> {
        let span = info_span!("prepare_download", run_id = %self.run_id);
        let result = self.try_prepare_download().instrument(span).await;
        self.settle(result)
    }

    async fn try_prepare_download(&mut self) -> Result<()> {
        let (location, file) = match (
            &self.stage,
            self.state.signed_asset.as_ref(),
            self.state.selected_file.as_ref(),
        ) {
            (Stage::Signed, Some(location), Some(file)) => (location, file),
            _ => return Err(SignerError::Validation("Sign the asset first.".to_string())),
        };

        info!("🔗 Requesting download URL...");
        let resp = self
            .api
            .presign_download(&location.bucket, &location.key)
            .await?;
        self.stage = Stage::DownloadPresigned;

        let url = resp
            .str_field("url")
            .ok_or_else(|| SignerError::MissingField("url".to_string()))?;

        self.state.download_ready = Some(DownloadReady {
            url: url.to_string(),
            suggested_file_name: suggest_signed_name(file.name()),
        });
        self.stage = Stage::SaveReady;
        info!("📦 Ready to save signed file.");
        Ok(())
    }

    /// Upload, sign and download presign in one go.
    pub async fn sign_and_prepare(&mut self, manifest_text: &str) -> Result<()> {
        self.upload(manifest_text).await?;
        self.sign().await?;
        self.prepare_download().await
    }

    /// Fetches the signed bytes and writes them to the chosen destination.
    /// Returns `None` when the destination prompt was cancelled.
    pub async fn save(&mut self, destination: &dyn SaveDestination) -> Result<Option<SavedFile>> {
        let span = info_span!("save", run_id = %self.run_id);
        let result = self.try_save(destination).instrument(span).await;
        self.settle(result)
    }

    async fn try_save(&mut self, destination: &dyn SaveDestination) -> Result<Option<SavedFile>> {
        let ready = match (&self.stage, self.state.download_ready.as_ref()) {
            (Stage::SaveReady, Some(ready)) => ready,
            _ => return Err(SignerError::Validation("Nothing to save.".to_string())),
        };

        let Some(dest) = destination.choose(&ready.suggested_file_name).await? else {
            return Ok(None);
        };

        info!("⬇️  Downloading signed bytes...");
        let bytes = self.api.download_from_s3(&ready.url).await?;

        info!("💾 Writing file {}...", dest.name());
        dest.write(&bytes).await?;

        let saved = SavedFile {
            name: dest.name().to_string(),
            size: bytes.len(),
            sha256: sha256_hex(&bytes),
        };
        info!(
            "🎉 Saved signed file {} ({} bytes, sha256 {})",
            saved.name,
            saved.size,
            short_digest(&saved.sha256)
        );

        self.state.saved = Some(saved.clone());
        self.stage = Stage::Saved;
        Ok(Some(saved))
    }

    /// Runs every stage in order. Returns `None` if either file prompt was
    /// cancelled.
    pub async fn run(
        &mut self,
        selector: &dyn FileSelector,
        manifest_text: &str,
        destination: &dyn SaveDestination,
    ) -> Result<Option<PipelineReport>> {
        if !self.pick(selector).await? {
            return Ok(None);
        }
        self.sign_and_prepare(manifest_text).await?;
        if self.save(destination).await?.is_none() {
            return Ok(None);
        }
        Ok(self.report())
    }

    /// Summary of a run that reached [`Stage::Saved`].
    pub fn report(&self) -> Option<PipelineReport> {
        if self.stage != Stage::Saved {
            return None;
        }
        let file = self.state.selected_file.as_ref()?;
        let receipt = self.state.upload_receipt.as_ref()?;
        let signed = self.state.signed_asset.as_ref()?;
        let saved = self.state.saved.as_ref()?;

        Some(PipelineReport {
            run_id: self.run_id,
            source_name: file.name().to_string(),
            saved_name: saved.name.clone(),
            uploaded_bytes: receipt.size,
            uploaded_sha256: receipt.sha256.clone(),
            signed_bytes: saved.size,
            signed_sha256: saved.sha256.clone(),
            signed_asset_uri: signed.to_string(),
        })
    }

    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!(run_id = %self.run_id, stage = %self.stage, "❌ {}", e);
            self.last_error = Some(e.to_string());
            if !self.stage.is_terminal() {
                self.failed_at = Some(self.stage);
                self.stage = Stage::Failed;
            }
        }
        result
    }
}
