use asset_signer::config::SignerConfig;
use asset_signer::infrastructure::local_files::{PathDestination, PathSelector};
use asset_signer::infrastructure::signing;
use asset_signer::services::pipeline::Pipeline;
use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload, sign and fetch back an asset", long_about = None)]
struct Args {
    /// File to sign
    input: PathBuf,

    /// Where to save the signed file: a file path or a directory (default: next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Manifest JSON passed to the signing service (default: "{}")
    #[arg(short, long, conflicts_with = "manifest_file")]
    manifest: Option<String>,

    /// Read the manifest JSON from a file
    #[arg(long)]
    manifest_file: Option<PathBuf>,

    /// Signing API base URL (overrides SIGNING_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Signing API key (overrides SIGNING_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Request timeout in seconds (overrides SIGNING_REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Replace an existing file at the save destination
    #[arg(long)]
    overwrite: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_signer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("🚀 Starting asset signer for {}", args.input.display());

    let mut config = SignerConfig::from_env();
    if let Some(base) = args.api_base {
        config.api_base = Some(base);
    }
    if let Some(key) = args.api_key {
        config.api_key = Some(key);
    }
    if let Some(secs) = args.timeout {
        config.request_timeout_secs = Some(secs).filter(|s| *s > 0);
    }

    let api = signing::setup_signing_client(&config)?;

    let manifest = match (&args.manifest, &args.manifest_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (None, None) => String::new(),
    };

    let selector = PathSelector::new(&args.input);
    let destination = args
        .output
        .as_ref()
        .map(PathDestination::new)
        .unwrap_or_else(|| PathDestination::beside(&args.input))
        .overwrite(args.overwrite);

    let mut pipeline = Pipeline::new(api);
    match pipeline.run(&selector, &manifest, &destination).await {
        Ok(Some(report)) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                info!(
                    "✅ {} -> {} ({} bytes, sha256 {})",
                    report.source_name, report.saved_name, report.signed_bytes, report.signed_sha256
                );
            }
            Ok(())
        }
        Ok(None) => {
            warn!("🛑 Nothing saved (selection cancelled or destination exists)");
            Ok(())
        }
        Err(e) => {
            error!(
                "Pipeline halted at stage {}",
                pipeline
                    .failed_at()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
            Err(e.into())
        }
    }
}
