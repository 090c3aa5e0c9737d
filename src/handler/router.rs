//! Request routing dispatch module
//!
//! Two destinations: the health responder and the SPA asset resolver.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use super::pipeline::RequestContext;
use super::static_files::SpaAssets;
use crate::http;

pub const HEALTH_PATH: &str = "/health";

pub struct Router {
    assets: SpaAssets,
}

impl Router {
    pub const fn new(assets: SpaAssets) -> Self {
        Self { assets }
    }

    /// Method-agnostic: every method reaches the same destination.
    pub async fn route(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        if ctx.path() == HEALTH_PATH {
            return http::build_health_response();
        }
        self.assets.serve(ctx).await
    }
}
