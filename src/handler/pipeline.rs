//! Request pipeline
//!
//! Stages run in declaration order on the way in and in reverse order on the
//! way out, sharing one `RequestContext`. The router is the innermost step.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderMap;
use hyper::{Method, Request, Response, Uri, Version};
use std::net::SocketAddr;
use std::time::Instant;

use super::router::Router;

/// Everything a stage or the router may look at, plus the headers stages
/// want on the response.
#[derive(Debug)]
pub struct RequestContext {
    pub remote_addr: SocketAddr,
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    /// Applied to the final response; headers the router sets itself win
    pub response_headers: HeaderMap,
    pub started: Instant,
}

impl RequestContext {
    pub fn new<B>(req: Request<B>, remote_addr: SocketAddr) -> Self {
        let (parts, _body) = req.into_parts();
        Self {
            remote_addr,
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            response_headers: HeaderMap::new(),
            started: Instant::now(),
        }
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }
}

/// A step wrapped around the router
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs before routing
    fn on_request(&self, ctx: &mut RequestContext);

    /// Runs after routing, innermost stage first
    fn on_response(&self, _ctx: &RequestContext, _response: &Response<Full<Bytes>>) {}
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    router: Router,
}

impl Pipeline {
    pub fn new(router: Router) -> Self {
        Self {
            stages: Vec::new(),
            router,
        }
    }

    /// Append a stage; earlier stages wrap later ones
    #[must_use]
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub async fn handle<B>(&self, req: Request<B>, remote_addr: SocketAddr) -> Response<Full<Bytes>> {
        let mut ctx = RequestContext::new(req, remote_addr);

        for stage in &self.stages {
            stage.on_request(&mut ctx);
        }

        let mut response = self.router.route(&ctx).await;
        apply_headers(&ctx.response_headers, &mut response);
        if ctx.is_head() {
            strip_body(&mut response);
        }

        for stage in self.stages.iter().rev() {
            stage.on_response(&ctx, &response);
        }

        response
    }
}

fn apply_headers(staged: &HeaderMap, response: &mut Response<Full<Bytes>>) {
    let headers = response.headers_mut();
    for name in staged.keys() {
        if headers.contains_key(name) {
            continue;
        }
        for value in staged.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
}

/// HEAD keeps status and headers (including Content-Length) but no body
fn strip_body(response: &mut Response<Full<Bytes>>) {
    if response.body().size_hint().exact() != Some(0) {
        *response.body_mut() = Full::new(Bytes::new());
    }
}
