use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

pub type LaplaceResult<T> = Result<T, LaplaceError>;

#[derive(Debug, Error)]
pub enum LaplaceError {
    /// A parameter was rejected before any computation started.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// The comparison figure could not be written.
    #[error("failed to render {path}: {details}")]
    RenderFailure { path: PathBuf, details: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LaplaceError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, details: impl ToString) -> Self {
        Self::RenderFailure {
            path: path.into(),
            details: details.to_string(),
        }
    }

    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}
