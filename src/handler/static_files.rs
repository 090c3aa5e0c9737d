//! Static file serving module
//!
//! Serves files from the asset root. Paths that do not name a file get the
//! index document instead, so client-side routes load the app shell.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};
use std::path::Path;

use super::pipeline::RequestContext;
use crate::assets::{normalize_request_path, AssetRoot, LoadedFile, ResolveError};
use crate::http::{self, cache, mime, RangeOutcome};
use crate::logger;

pub struct SpaAssets {
    root: AssetRoot,
    index_file: String,
}

impl SpaAssets {
    pub const fn new(root: AssetRoot, index_file: String) -> Self {
        Self { root, index_file }
    }

    pub async fn serve(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        let requested = match normalize_request_path(ctx.path(), &self.index_file) {
            Some(relative) => self.root.load(&relative, &self.index_file).await,
            None => Err(ResolveError::NotFound),
        };
        self.respond(ctx, requested).await
    }

    /// Missing and escaping paths get the index; read failures get a 500
    async fn respond(
        &self,
        ctx: &RequestContext,
        requested: Result<LoadedFile, ResolveError>,
    ) -> Response<Full<Bytes>> {
        match requested {
            Ok(file) => build_static_file_response(ctx, &file),
            Err(ResolveError::NotFound) => self.serve_index(ctx).await,
            Err(ResolveError::Escaped(target)) => {
                logger::log_warning(&format!(
                    "Path traversal attempt blocked: {} -> {}",
                    ctx.path(),
                    target.display()
                ));
                self.serve_index(ctx).await
            }
            Err(e @ ResolveError::Io { .. }) => {
                logger::log_error(&e.to_string());
                http::build_500_response()
            }
        }
    }

    /// SPA fallback: the index document with 200, whatever was asked for
    async fn serve_index(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        match self.root.load(Path::new(&self.index_file), &self.index_file).await {
            Ok(file) => build_static_file_response(ctx, &file),
            Err(ResolveError::NotFound | ResolveError::Escaped(_)) => {
                logger::log_error(&format!(
                    "Index document '{}' missing under {}",
                    self.index_file,
                    self.root.path().display()
                ));
                http::build_404_response()
            }
            Err(e @ ResolveError::Io { .. }) => {
                logger::log_error(&e.to_string());
                http::build_500_response()
            }
        }
    }
}

/// Build a file response, honouring `If-Modified-Since` and `Range` on
/// GET and HEAD.
fn build_static_file_response(ctx: &RequestContext, file: &LoadedFile) -> Response<Full<Bytes>> {
    let content_type = mime::content_type_for(&file.path);
    let last_modified = file.modified.map(cache::last_modified);
    let conditional = ctx.method == Method::GET || ctx.method == Method::HEAD;

    if conditional {
        if let (Some(modified), Some(lm)) = (file.modified, last_modified.as_deref()) {
            if cache::is_not_modified(ctx.header("if-modified-since"), modified) {
                return http::build_304_response(lm);
            }
        }

        let total = file.data.len() as u64;
        match http::parse_range(ctx.header("range"), total) {
            RangeOutcome::Partial(range) => {
                return http::build_partial_response(
                    &file.data,
                    range,
                    &content_type,
                    last_modified.as_deref(),
                );
            }
            RangeOutcome::Unsatisfiable => return http::build_416_response(total),
            RangeOutcome::Full => {}
        }
    }

    http::build_file_response(file.data.clone(), &content_type, last_modified.as_deref())
}
