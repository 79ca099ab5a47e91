//! Host-supplied asset access.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::ir::Effect;
use crate::parser::Parser;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {locator}: {source}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("asset {0} is not valid UTF-8")]
    InvalidUtf8(String),
}

impl LoadError {
    pub fn locator(&self) -> &str {
        match self {
            LoadError::Io { locator, .. } => locator,
            LoadError::NotFound(locator) | LoadError::InvalidUtf8(locator) => locator,
        }
    }
}

/// Fetches effect sources and texture bytes by locator.
pub trait AssetLoader: Send + Sync {
    fn load_text(&self, locator: &str) -> impl Future<Output = Result<String, LoadError>> + Send;

    fn load_bytes(&self, locator: &str)
        -> impl Future<Output = Result<Vec<u8>, LoadError>> + Send;
}

/// Loads from the local filesystem, resolving locators against `root`.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    root: Option<PathBuf>,
}

impl FsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, locator: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(locator),
            None => PathBuf::from(locator),
        }
    }

    fn map_err(locator: &str, err: std::io::Error) -> LoadError {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound(locator.to_string())
        } else {
            LoadError::Io {
                locator: locator.to_string(),
                source: err,
            }
        }
    }
}

impl AssetLoader for FsLoader {
    async fn load_text(&self, locator: &str) -> Result<String, LoadError> {
        let bytes = self.load_bytes(locator).await?;
        String::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8(locator.to_string()))
    }

    async fn load_bytes(&self, locator: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(locator);
        debug!(path = %path.display(), "reading asset");
        tokio::fs::read(&path)
            .await
            .map_err(|err| Self::map_err(locator, err))
    }
}

/// In-memory assets keyed by exact locator.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    assets: HashMap<String, Arc<[u8]>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locator: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.assets
            .insert(locator.into(), Arc::from(bytes.into().into_boxed_slice()));
    }

    pub fn with(mut self, locator: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(locator, bytes);
        self
    }

    fn get(&self, locator: &str) -> Result<Arc<[u8]>, LoadError> {
        self.assets
            .get(locator)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(locator.to_string()))
    }
}

impl AssetLoader for MemoryLoader {
    async fn load_text(&self, locator: &str) -> Result<String, LoadError> {
        let bytes = self.get(locator)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| LoadError::InvalidUtf8(locator.to_string()))
    }

    async fn load_bytes(&self, locator: &str) -> Result<Vec<u8>, LoadError> {
        Ok(self.get(locator)?.to_vec())
    }
}

/// File name used for an effect loaded from `locator`.
pub fn file_name_of(locator: &str) -> &str {
    match locator.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "unknown.fx",
    }
}

/// Loads `locator` and parses it. Fails only when the fetch fails.
pub async fn load_and_parse<L: AssetLoader>(
    loader: &L,
    parser: &Parser,
    locator: &str,
) -> Result<Effect, LoadError> {
    let text = loader.load_text(locator).await?;
    Ok(parser.parse(&text, file_name_of(locator)))
}
