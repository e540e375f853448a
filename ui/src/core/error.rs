use thiserror::Error;

/// Failures that end a screenshot attempt.
///
/// Asset problems are not here: a missing image degrades the snapshot but
/// never aborts it (see `export::assets::AssetStatus`).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    #[error("Couldn't find anything to capture for `{0}`")]
    ElementNotFound(String),
    /// Worded like [`ExportError::ElementNotFound`]; only logs tell them apart.
    #[error("Couldn't find anything to capture for `{0}`")]
    InvalidSelector(String),
    #[error("Unable to read the page: {0}")]
    Page(String),
    #[error("Screenshot failed: {0}")]
    Rasterization(String),
    #[error("PNG encoding failed: {0}")]
    Encoding(String),
    #[error("Download failed: {0}")]
    Delivery(String),
}
