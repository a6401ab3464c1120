//! Providers loading district boundary GeoJSON from a local file or an HTTP endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use tokio::fs;
use tracing::info;

use civmap_core::{
    districts::{BoundaryFeature, parse_boundary_collection},
    ports::{BoundaryPort, CivmapError},
};

/// Boundary port fetching a `FeatureCollection` over HTTP.
pub struct HttpBoundaryPort {
    client: Client,
    url: String,
}

impl HttpBoundaryPort {
    /// Create a new port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BoundaryPort for HttpBoundaryPort {
    fn location(&self) -> &str {
        &self.url
    }

    async fn boundaries(&self) -> Result<Vec<BoundaryFeature>, CivmapError> {
        let body = fetch_text(self.client.get(&self.url)).await?;
        let features = parse_boundary_collection(&body)?;
        info!(url = %self.url, count = features.len(), "fetched district boundaries");
        Ok(features)
    }
}

/// Boundary port reading a `FeatureCollection` from disk.
pub struct FileBoundaryPort {
    path: PathBuf,
    location: String,
}

impl FileBoundaryPort {
    /// Create a port reading the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let location = path.display().to_string();
        Self { path, location }
    }
}

#[async_trait]
impl BoundaryPort for FileBoundaryPort {
    fn location(&self) -> &str {
        &self.location
    }

    async fn boundaries(&self) -> Result<Vec<BoundaryFeature>, CivmapError> {
        let body = fs::read_to_string(&self.path).await?;
        let features = parse_boundary_collection(&body)?;
        info!(path = %self.location, count = features.len(), "read district boundaries");
        Ok(features)
    }
}

/// Pick the port for a configured location: `http(s)://` URLs go over the
/// network, anything else is a file path.
#[must_use]
pub fn boundary_port(location: &str, client: Client) -> Arc<dyn BoundaryPort> {
    let trimmed = location.trim();
    if is_remote(trimmed) {
        Arc::new(HttpBoundaryPort::new(client, trimmed))
    } else {
        Arc::new(FileBoundaryPort::new(trimmed))
    }
}

fn is_remote(location: &str) -> bool {
    let lowered = location.to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

// Small helper to fetch a body with status handling.
async fn fetch_text(req: RequestBuilder) -> Result<String, CivmapError> {
    req.send()
        .await
        .map_err(CivmapError::from)?
        .error_for_status()
        .map_err(CivmapError::from)?
        .text()
        .await
        .map_err(CivmapError::from)
}
