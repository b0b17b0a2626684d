use crate::config::SignerConfig;
use crate::error::Result;
use crate::services::signing_client::{SigningApi, SigningClient};
use std::sync::Arc;
use tracing::info;

pub fn setup_signing_client(config: &SignerConfig) -> Result<Arc<dyn SigningApi>> {
    let api_config = config.api_config()?;

    info!(
        "☁️  Signing API: {} (timeout: {})",
        api_config.base_url,
        api_config
            .request_timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string())
    );

    let client = SigningClient::new(api_config)?;
    Ok(Arc::new(client))
}
