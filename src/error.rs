// src/error.rs
use sheetflow_layout::LayoutError;
use sheetflow_traits::CollectionError;
use thiserror::Error;

/// Errors of a whole pagination run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Collection fallback failed: {0}")]
    Collection(#[from] CollectionError),

    #[error("Layout was restarted {0} times without settling")]
    RestartLimitExceeded(usize),
}
