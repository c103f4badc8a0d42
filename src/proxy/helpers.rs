//! Proxy utility functions.
//!
//! This module contains helper functions for request processing:
//! - Header extraction from Pingora requests
//! - Client IP detection (X-Forwarded-For aware)
//! - Writing a locally generated response to the session

use bytes::Bytes;
use pingora_core::Result;
use pingora_http::{RequestHeader, ResponseHeader};
use pingora_proxy::Session;

/// Extract a header value as a string.
///
/// Returns `None` when the header is missing or not valid UTF-8.
pub fn header_value(req: &RequestHeader, name: &str) -> Option<String> {
    req.headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract client IP address from session (X-Forwarded-For aware).
///
/// Checks X-Forwarded-For header first (for proxies/load balancers),
/// then falls back to direct connection IP from session.
pub fn get_client_ip(session: &Session) -> String {
    if let Some(forwarded_for) = header_value(session.req_header(), "x-forwarded-for") {
        // "client, proxy1, proxy2": the first entry is the original client
        if let Some(client_ip) = first_forwarded_ip(&forwarded_for) {
            return client_ip;
        }
    }

    session
        .client_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn first_forwarded_ip(forwarded_for: &str) -> Option<String> {
    forwarded_for
        .split(',')
        .next()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(|ip| ip.to_string())
}

/// Write a complete response (header and body) and end the stream.
pub async fn write_response(
    session: &mut Session,
    status: u16,
    headers: &[(&'static str, String)],
    body: Bytes,
) -> Result<()> {
    let mut header = ResponseHeader::build(status, Some(headers.len()))?;
    for (name, value) in headers {
        header.insert_header(*name, value.as_str())?;
    }

    session
        .write_response_header(Box::new(header), false)
        .await?;
    session.write_response_body(Some(body), true).await?;
    Ok(())
}
