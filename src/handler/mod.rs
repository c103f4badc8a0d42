//! Image request handler.
//!
//! Ties the pieces together for one request:
//!
//! ```text
//! path ──► extract ──► percent-decode key ──► ObjectStore::fetch
//!                                                   │
//!        ImageResponse ◄── transform (blocking) ◄───┘
//! ```
//!
//! The handler never touches the HTTP session. It returns an
//! [`ImageResponse`] that the proxy writes out, so the whole flow is testable
//! with an in-memory store.

use bytes::Bytes;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::{DEFAULT_CACHE_CONTROL, DEFAULT_ROUTE_PREFIX, IMAGE_CONTENT_TYPE};
use crate::error::HandlerError;
use crate::image_optimizer::{
    encode_target, extract_with_prefix, transform, vary_header, OutputFormat, ProcessedImage,
    TransformLimits,
};
use crate::storage::ObjectStore;

/// Receives every failure that is not a plain "file not found"
#[cfg_attr(test, mockall::automock)]
pub trait DiagnosticSink: Send + Sync {
    fn log(&self, path: &str, error: &HandlerError);
}

/// Sink that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, path: &str, error: &HandlerError) {
        tracing::error!(path = %path, error = %error, "Error retrieving file");
    }
}

/// Per-deployment settings for the handler
#[derive(Debug, Clone)]
pub struct HandlerOptions {
    /// Routing prefix, with leading and trailing slash
    pub prefix: String,
    /// Format used when forcing, and for sources we cannot write back
    pub preferred_format: OutputFormat,
    pub limits: TransformLimits,
    pub cache_control: String,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            preferred_format: OutputFormat::WebP,
            limits: TransformLimits::default(),
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
        }
    }
}

impl From<&Config> for HandlerOptions {
    fn from(config: &Config) -> Self {
        Self {
            prefix: config.routing.prefix.clone(),
            preferred_format: config.image.target_format,
            limits: TransformLimits::from(&config.image),
            cache_control: config.response.cache_control.clone(),
        }
    }
}

/// Fully-formed response for one image request
#[derive(Debug, Clone)]
pub struct ImageResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Bytes,
}

impl ImageResponse {
    fn image(image: ProcessedImage, cache_control: &str) -> Self {
        let body = Bytes::from(image.data);
        Self {
            status: 200,
            headers: vec![
                ("Content-Type", IMAGE_CONTENT_TYPE.to_string()),
                ("Cache-Control", cache_control.to_string()),
                ("Vary", vary_header().to_string()),
                ("Content-Length", body.len().to_string()),
            ],
            body,
        }
    }

    fn error(error: &HandlerError) -> Self {
        let body = Bytes::from_static(error.public_message().as_bytes());
        Self {
            status: error.status(),
            headers: vec![
                ("Content-Type", "text/plain".to_string()),
                ("Content-Length", body.len().to_string()),
            ],
            body,
        }
    }

    /// First value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub struct ImageHandler {
    store: Arc<dyn ObjectStore>,
    sink: Arc<dyn DiagnosticSink>,
    options: HandlerOptions,
}

impl ImageHandler {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        sink: Arc<dyn DiagnosticSink>,
        options: HandlerOptions,
    ) -> Self {
        Self {
            store,
            sink,
            options,
        }
    }

    pub fn options(&self) -> &HandlerOptions {
        &self.options
    }

    /// Whether `path` belongs to this handler
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.options.prefix)
    }

    /// Serve one request. Never fails; errors become 404/500 responses.
    pub async fn handle(&self, path: &str, accept: Option<&str>) -> ImageResponse {
        match self.process(path, accept).await {
            Ok(image) => {
                tracing::debug!(
                    path = %path,
                    format = %image.format,
                    bytes = image.data.len(),
                    "Image served"
                );
                ImageResponse::image(image, &self.options.cache_control)
            }
            Err(err) if err.is_not_found() => {
                tracing::debug!(path = %path, error = %err, "File not found");
                ImageResponse::error(&err)
            }
            Err(err) => {
                self.sink.log(path, &err);
                ImageResponse::error(&err)
            }
        }
    }

    /// Fetch and transform the image named by `path`
    pub async fn process(
        &self,
        path: &str,
        accept: Option<&str>,
    ) -> Result<ProcessedImage, HandlerError> {
        if !self.matches(path) {
            return Err(HandlerError::RouteMiss {
                path: path.to_string(),
            });
        }

        let params = extract_with_prefix(path, &self.options.prefix);
        let key = urlencoding::decode(&params.file_path)
            .map_err(|e| HandlerError::KeyDecode(e.to_string()))?
            .into_owned();
        if key.is_empty() {
            // Anything past the prefix here was parameter segments only
            let path = path.to_string();
            return Err(if path.len() > self.options.prefix.len() {
                HandlerError::MissingKey { path }
            } else {
                HandlerError::RouteMiss { path }
            });
        }

        let source = self.store.fetch(&key).await?;

        let target = encode_target(self.options.preferred_format, accept);
        let limits = self.options.limits;
        let (width, height) = (params.width, params.height);

        let image =
            tokio::task::spawn_blocking(move || transform(&source, width, height, target, &limits))
                .await??;

        Ok(image)
    }
}
