use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignerError>;

#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("S3 PUT failed {status} {status_text}: {body}")]
    Upload {
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Missing field in response: {0}")]
    MissingField(String),

    #[error("GET failed: {status} {status_text}")]
    Download { status: u16, status_text: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl SignerError {
    /// HTTP status carried by the error, if the remote side produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SignerError::Http { status, .. }
            | SignerError::Upload { status, .. }
            | SignerError::Download { status, .. } => Some(*status),
            SignerError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
