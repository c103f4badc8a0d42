// Request pipeline module - per-request context carried through the proxy

use std::time::Instant;
use uuid::Uuid;

/// Request context that holds the information about an HTTP request the
/// handler and the access log need
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: String,
    path: String,
    accept: Option<String>,
    started_at: Instant,
    status: Option<u16>,
}

impl RequestContext {
    /// Create a new RequestContext from HTTP request information
    /// Automatically generates a unique request ID (UUID v4)
    pub fn new(method: String, path: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            path,
            accept: None,
            started_at: Instant::now(),
            status: None,
        }
    }

    /// Attach the client's Accept header
    pub fn with_accept(mut self, accept: Option<String>) -> Self {
        self.accept = accept;
        self
    }

    /// Get the unique request ID
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Get the HTTP method
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request path (without query string)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Record the status written to the client
    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Milliseconds since the context was created
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(String::new(), String::new())
    }
}
