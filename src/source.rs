//! Document sources
//!
//! Fetches raw JSON documents by path relative to a data root. Supports:
//! - Local directory (default `./data`)
//! - HTTP(S) base URL
//! - In-memory map (tests, demos)

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Retrieves parsed JSON documents by relative path
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError>;
}

/// Pick a source for a data root: URLs go over HTTP, anything else is a directory
pub fn source_for_root(data_root: &str) -> Box<dyn DocumentSource> {
    if data_root.starts_with("http://") || data_root.starts_with("https://") {
        Box::new(HttpSource::new(data_root))
    } else {
        Box::new(FileSource::new(data_root))
    }
}

/// Reads documents from a local directory
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let full_path = self.root.join(path);
        log::debug!("Reading document {:?}", full_path);

        let content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::NotFound(path.to_string())
                } else {
                    FetchError::Io {
                        path: path.to_string(),
                        source: e,
                    }
                }
            })?;

        serde_json::from_str(&content).map_err(|e| FetchError::Json {
            path: path.to_string(),
            source: e,
        })
    }
}

/// Fetches documents with HTTP GET relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                path: path.to_string(),
                source: e,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Http {
            path: path.to_string(),
            source: e,
        })?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            path: path.to_string(),
            source: e,
        })
    }
}

/// In-memory documents keyed by path. Missing paths fail with `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, Value>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<String>, document: Value) -> Self {
        self.documents.insert(path.into(), document);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, document: Value) {
        self.documents.insert(path.into(), document);
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}
