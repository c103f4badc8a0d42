// Proxy module - Pingora front end for the image handler
//
// Every request is answered locally from request_filter; nothing is proxied
// upstream.

use async_trait::async_trait;
use pingora_core::upstreams::peer::HttpPeer;
use pingora_core::Result;
use pingora_proxy::{ProxyHttp, Session};
use std::sync::Arc;
use std::time::Instant;

use crate::constants::HEALTH_PATH;
use crate::handler::ImageHandler;
use crate::pipeline::RequestContext;

pub mod helpers;
pub mod special_endpoints;

use helpers::{get_client_ip, header_value, write_response};
use special_endpoints::handle_health;

pub struct ImageProxy {
    handler: Arc<ImageHandler>,
    start_time: Instant,
}

impl ImageProxy {
    pub fn new(handler: Arc<ImageHandler>) -> Self {
        Self {
            handler,
            start_time: Instant::now(),
        }
    }

    pub fn handler(&self) -> &ImageHandler {
        &self.handler
    }
}

#[async_trait]
impl ProxyHttp for ImageProxy {
    type CTX = RequestContext;

    /// Create a new request context for each incoming request
    fn new_ctx(&self) -> Self::CTX {
        RequestContext::default()
    }

    /// Never reached: request_filter answers every request
    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> Result<Box<HttpPeer>> {
        Err(pingora_core::Error::explain(
            pingora_core::ErrorType::InternalError,
            "Image proxy has no upstream",
        ))
    }

    async fn request_filter(&self, session: &mut Session, ctx: &mut Self::CTX) -> Result<bool> {
        let req = session.req_header();
        let path = req.uri.path().to_string();
        let method = req.method.to_string();
        let accept = header_value(req, "accept");

        *ctx = RequestContext::new(method, path).with_accept(accept);

        if ctx.path() == HEALTH_PATH {
            let health = handle_health(self.start_time);
            let headers = health.headers();
            write_response(session, health.status, &headers, health.body.into()).await?;
            ctx.set_status(health.status);
            return Ok(true);
        }

        let response = self.handler.handle(ctx.path(), ctx.accept()).await;
        write_response(session, response.status, &response.headers, response.body).await?;
        ctx.set_status(response.status);

        Ok(true)
    }

    async fn logging(
        &self,
        session: &mut Session,
        e: Option<&pingora_core::Error>,
        ctx: &mut Self::CTX,
    ) {
        let status_code = ctx
            .status()
            .or_else(|| session.response_written().map(|r| r.status.as_u16()))
            .unwrap_or(500);

        let client_ip = get_client_ip(session);

        if let Some(error) = e {
            tracing::warn!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = %ctx.path(),
                client_ip = %client_ip,
                error = %error,
                "Request ended with error"
            );
        }

        tracing::info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            status = status_code,
            duration_ms = ctx.elapsed_ms(),
            client_ip = %client_ip,
            "Request completed"
        );
    }
}
