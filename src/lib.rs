pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::config::{ApiConfig, SignerConfig};
pub use crate::error::{Result, SignerError};
pub use crate::services::pipeline::{Pipeline, Stage};
pub use crate::services::signing_client::{SigningApi, SigningClient};
