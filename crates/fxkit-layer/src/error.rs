use fxkit_effect::LoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("failed to load effect {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
}

impl StackError {
    pub fn path(&self) -> &str {
        match self {
            StackError::Load { path, .. } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("source {index} has an empty path")]
    EmptyPath { index: usize },
    #[error("duplicate source path: {0}")]
    DuplicatePath(String),
}

/// A command line or config value that names no known option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseSelectorError {
    pub kind: &'static str,
    pub value: String,
}
