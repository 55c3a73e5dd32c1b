use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlossaError>;

#[derive(Debug, Error)]
pub enum GlossaError {
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("path is outside the document root: {0}")]
    PathOutsideRoot(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("stale edit position: {0}")]
    StaleEdit(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GlossaError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidScope(_) => "INVALID_SCOPE",
            Self::PathOutsideRoot(_) => "PATH_OUTSIDE_ROOT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::StaleEdit(_) => "STALE_EDIT",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}
