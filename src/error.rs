//! Error types for appendix-tree
//!
//! Loading failures are split by how far they travel:
//! - `FetchError` stays inside the normalizer for endpoint documents
//! - `NormalizeError` reaches the load pipeline and becomes a user-visible message
//! - `RenderError` / `LayoutError` are caught at the renderer boundary

use thiserror::Error;

/// Transport or decode failure for a single document
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching {path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for {path} failed with status {status}")]
    Status { path: String, status: u16 },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document not found: {0}")]
    NotFound(String),
}

impl FetchError {
    /// Path of the document that failed
    pub fn path(&self) -> &str {
        match self {
            FetchError::Io { path, .. }
            | FetchError::Http { path, .. }
            | FetchError::Status { path, .. }
            | FetchError::Json { path, .. } => path,
            FetchError::NotFound(path) => path,
        }
    }
}

/// Failure of one endpoint document. Never fatal on its own.
#[derive(Error, Debug)]
#[error("Endpoint {endpoint} dropped: {source}")]
pub struct EndpointFetchError {
    pub endpoint: String,
    #[source]
    pub source: FetchError,
}

/// Failure of the whole normalization pipeline
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No valid data loaded from endpoints ({failed} of {declared} failed)")]
    EmptyData { declared: usize, failed: usize },

    #[error("Transformed data is empty: no section has any rules")]
    EmptyTree,
}

/// Malformed node data reaching the renderer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Node at {path} has no name")]
    MissingName { path: String },

    #[error("No node at {path}")]
    UnknownNode { path: String },
}

/// Degenerate geometry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Viewport too small for layout ({width}x{height})")]
    DegenerateViewport { width: f32, height: f32 },
}

/// Anything the renderer boundary can catch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
