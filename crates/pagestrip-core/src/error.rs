use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StripError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("OCR timed out after {seconds}s on page {page}")]
    OcrTimeout { page: usize, seconds: u64 },

    #[error("no body text left in '{source_name}' after stripping {stripped} line(s); the patterns are probably too aggressive")]
    EmptyDocument {
        source_name: String,
        stripped: usize,
    },

    #[error("failed to load pattern file {path}: {reason}")]
    PatternLoad { path: PathBuf, reason: String },

    #[error("invalid pattern library: {0}")]
    PatternInvalid(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("{failed} of {total} file(s) could not be converted")]
    BatchFailed { failed: usize, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StripError {
    /// Page-level failures degrade a single page instead of aborting the document.
    pub fn is_page_level(&self) -> bool {
        matches!(
            self,
            StripError::OcrUnavailable(_) | StripError::OcrTimeout { .. }
        )
    }
}
