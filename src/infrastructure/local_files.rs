use crate::error::{Result, SignerError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handle to a local file picked for signing or chosen as a save target.
#[async_trait]
pub trait FileHandle: Send + Sync {
    /// File name without directory components
    fn name(&self) -> &str;

    async fn read(&self) -> Result<Vec<u8>>;

    async fn write(&self, data: &[u8]) -> Result<()>;
}

/// Single-file open dialog. `Ok(None)` means the operator cancelled.
#[async_trait]
pub trait FileSelector: Send + Sync {
    async fn select(&self) -> Result<Option<Box<dyn FileHandle>>>;
}

/// Save dialog seeded with a suggested name. `Ok(None)` means cancelled.
#[async_trait]
pub trait SaveDestination: Send + Sync {
    async fn choose(&self, suggested_name: &str) -> Result<Option<Box<dyn FileHandle>>>;
}

pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string())
            .ok_or_else(|| {
                SignerError::Validation(format!("Not a file path: {}", path.display()))
            })?;
        Ok(Self { path, name })
    }
}

#[async_trait]
impl FileHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    async fn write(&self, data: &[u8]) -> Result<()> {
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }
}

/// Selects a fixed path given on the command line.
pub struct PathSelector {
    path: PathBuf,
}

impl PathSelector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FileSelector for PathSelector {
    async fn select(&self) -> Result<Option<Box<dyn FileHandle>>> {
        let meta = tokio::fs::metadata(&self.path).await.map_err(|e| {
            SignerError::Validation(format!("Cannot open {}: {}", self.path.display(), e))
        })?;
        if !meta.is_file() {
            return Err(SignerError::Validation(format!(
                "{} is not a regular file",
                self.path.display()
            )));
        }
        Ok(Some(Box::new(LocalFile::new(self.path.clone())?)))
    }
}

/// Resolves the save target: an explicit file path, or a directory that the
/// suggested name is joined onto.
pub struct PathDestination {
    target: PathBuf,
    overwrite: bool,
}

impl PathDestination {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            overwrite: false,
        }
    }

    /// Saves next to the source file.
    pub fn beside(source: &Path) -> Self {
        let dir = source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::new(dir)
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[async_trait]
impl SaveDestination for PathDestination {
    async fn choose(&self, suggested_name: &str) -> Result<Option<Box<dyn FileHandle>>> {
        let is_dir = tokio::fs::metadata(&self.target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        let path = if is_dir {
            self.target.join(suggested_name)
        } else {
            self.target.clone()
        };

        if !self.overwrite && tokio::fs::try_exists(&path).await? {
            info!("⏭️  {} already exists, not overwriting", path.display());
            return Ok(None);
        }

        Ok(Some(Box::new(LocalFile::new(path)?)))
    }
}
