//! Pipeline stages: request logging and security headers

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::Response;

use super::pipeline::{RequestContext, Stage};
use crate::http::headers::SECURITY_HEADERS;
use crate::logger::{self, AccessLogEntry};

/// Logs every inbound request before anything else sees it, and optionally
/// an access log line once the response is known.
pub struct Logging {
    access_log_format: Option<String>,
}

impl Logging {
    pub const fn new(access_log_format: Option<String>) -> Self {
        Self { access_log_format }
    }
}

impl Stage for Logging {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn on_request(&self, ctx: &mut RequestContext) {
        logger::log_request(&ctx.remote_addr, &ctx.method, &ctx.uri);
    }

    fn on_response(&self, ctx: &RequestContext, response: &Response<Full<Bytes>>) {
        let Some(format) = &self.access_log_format else {
            return;
        };
        let bytes = response.body().size_hint().exact().unwrap_or(0);
        let entry = AccessLogEntry::from_exchange(ctx, response.status().as_u16(), bytes);
        logger::log_access(&entry, format);
    }
}

/// Stamps the fixed security header table on every response
pub struct SecurityHeaders;

impl Stage for SecurityHeaders {
    fn name(&self) -> &'static str {
        "security-headers"
    }

    fn on_request(&self, ctx: &mut RequestContext) {
        for (name, value) in &SECURITY_HEADERS {
            ctx.response_headers.insert(name.clone(), value.clone());
        }
    }
}
