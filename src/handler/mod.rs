//! Request handler module
//!
//! The request pipeline, its stages, and the router behind them.

pub mod pipeline;
pub mod router;
pub mod stages;
pub mod static_files;

pub use pipeline::{Pipeline, RequestContext, Stage};
pub use router::Router;
pub use static_files::SpaAssets;

use crate::assets::AssetRoot;
use crate::config::Config;

/// Assemble the request pipeline. Order, outermost first: logging, security
/// headers, then routing.
pub fn build_pipeline(config: &Config, root: AssetRoot) -> Pipeline {
    let assets = SpaAssets::new(root, config.assets.index_file.clone());

    Pipeline::new(Router::new(assets))
        .stage(stages::Logging::new(config.logging.access_log_format.clone()))
        .stage(stages::SecurityHeaders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::{CONTENT_SECURITY_POLICY, SECURITY_HEADERS};
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::{Method, Request, Response, StatusCode};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const INDEX: &[u8] = b"<!doctype html><div id=\"root\"></div>";
    const LOGO: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

    fn peer() -> SocketAddr {
        "203.0.113.7:51234".parse().unwrap()
    }

    fn test_config() -> Config {
        Config::load_with("does-not-exist/config", Some(HashMap::new()), None).unwrap()
    }

    /// Asset root with `index.html`, `logo.png` and `assets/app.js`
    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        std::fs::write(dir.path().join("logo.png"), LOGO).unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), b"console.log('hi')").unwrap();
        dir
    }

    fn pipeline_for(dir: &Path) -> Pipeline {
        build_pipeline(&test_config(), AssetRoot::new(dir.to_path_buf()).unwrap())
    }

    async fn send(pipeline: &Pipeline, method: Method, uri: &str) -> Response<http_body_util::Full<Bytes>> {
        send_with(pipeline, method, uri, &[]).await
    }

    async fn send_with(
        pipeline: &Pipeline,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> Response<http_body_util::Full<Bytes>> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder.body(Empty::<Bytes>::new()).unwrap();
        pipeline.handle(req, peer()).await
    }

    async fn body_of(response: Response<http_body_util::Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    fn assert_security_headers(response: &Response<http_body_util::Full<Bytes>>) {
        for (name, value) in &SECURITY_HEADERS {
            assert_eq!(
                response.headers().get(name),
                Some(value),
                "missing or wrong {name}"
            );
        }
    }

    #[test]
    fn test_stage_order() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());
        assert_eq!(pipeline.stage_names(), vec!["logging", "security-headers"]);
    }

    #[tokio::test]
    async fn test_existing_file_is_served_verbatim() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        let response = send(&pipeline, Method::GET, "/logo.png").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
        assert_eq!(response.headers()["content-length"], LOGO.len().to_string().as_str());
        assert!(response.headers().contains_key("last-modified"));
        assert_eq!(body_of(response).await, LOGO);

        let response = send(&pipeline, Method::GET, "/assets/app.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, "console.log('hi')");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        let response = send(&pipeline, Method::GET, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(body_of(response).await, INDEX);
    }

    #[tokio::test]
    async fn test_unknown_paths_fall_back_to_index() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        for uri in [
            "/about",
            "/pokemon/bulbasaur",
            "/missing.png",
            "/assets/",
            "/logo.png/extra",
            "/about?tab=stats",
        ] {
            let response = send(&pipeline, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(body_of(response).await, INDEX, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_health_any_method() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS] {
            let response = send(&pipeline, method.clone(), "/health").await;
            assert_eq!(response.status(), StatusCode::OK, "{method}");
            assert_eq!(response.headers()["content-type"], "application/json");
            assert_security_headers(&response);
            assert_eq!(body_of(response).await, r#"{"status": "ok"}"#);
        }
    }

    #[tokio::test]
    async fn test_health_does_not_touch_assets() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());
        std::fs::remove_file(dir.path().join("index.html")).unwrap();

        let response = send(&pipeline, Method::GET, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, r#"{"status": "ok"}"#);
    }

    #[tokio::test]
    async fn test_security_headers_everywhere() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        for uri in ["/", "/logo.png", "/about", "/health", "/../../etc/passwd"] {
            let response = send(&pipeline, Method::GET, uri).await;
            assert_security_headers(&response);
        }
        let response = send_with(&pipeline, Method::GET, "/logo.png", &[("range", "bytes=0-1")]).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_security_headers(&response);

        let response = send(&pipeline, Method::GET, "/").await;
        assert_eq!(
            response.headers()["content-security-policy"],
            CONTENT_SECURITY_POLICY
        );
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["cross-origin-opener-policy"], "same-origin");
    }

    #[tokio::test]
    async fn test_traversal_never_leaves_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("dist");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("index.html"), INDEX).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"top secret").unwrap();
        let pipeline = pipeline_for(&root);

        for uri in [
            "/../secret.txt",
            "/../../etc/passwd",
            "/%2e%2e/secret.txt",
            "/..%2fsecret.txt",
            "/assets/../../secret.txt",
        ] {
            let response = send(&pipeline, Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(body_of(response).await, INDEX, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), LOGO).unwrap();
        let pipeline = pipeline_for(dir.path());

        let response = send(&pipeline, Method::GET, "/about").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_security_headers(&response);

        // real files are still served
        let response = send(&pipeline, Method::GET, "/logo.png").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_head_has_headers_without_body() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        let response = send(&pipeline, Method::HEAD, "/logo.png").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-length"], LOGO.len().to_string().as_str());
        assert_security_headers(&response);
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_if_modified_since() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        let first = send(&pipeline, Method::GET, "/logo.png").await;
        let last_modified = first.headers()["last-modified"].to_str().unwrap().to_string();

        let response = send_with(
            &pipeline,
            Method::GET,
            "/logo.png",
            &[("if-modified-since", last_modified.as_str())],
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_security_headers(&response);
        assert!(body_of(response).await.is_empty());

        let response = send_with(
            &pipeline,
            Method::GET,
            "/logo.png",
            &[("if-modified-since", "Thu, 01 Jan 1970 00:00:00 GMT")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_range_requests() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        let response = send_with(&pipeline, Method::GET, "/logo.png", &[("range", "bytes=1-3")]).await;
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers()["content-range"],
            format!("bytes 1-3/{}", LOGO.len()).as_str()
        );
        assert_eq!(body_of(response).await, &LOGO[1..=3]);

        let response = send_with(&pipeline, Method::GET, "/logo.png", &[("range", "bytes=500-")]).await;
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);

        // not applied outside GET/HEAD
        let response = send_with(&pipeline, Method::POST, "/logo.png", &[("range", "bytes=1-3")]).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, LOGO);
    }

    #[tokio::test]
    async fn test_any_method_reaches_assets() {
        let dir = site();
        let pipeline = pipeline_for(dir.path());

        let response = send(&pipeline, Method::POST, "/about").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, INDEX);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_file_is_server_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = site();
        let locked = dir.path().join("logo.png");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::read(&locked).is_ok() {
            // privileged user, permission bits are not enforced
            return;
        }
        let pipeline = pipeline_for(dir.path());

        let response = send(&pipeline, Method::GET, "/logo.png").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_security_headers(&response);

        let response = send(&pipeline, Method::GET, "/about").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, INDEX);
    }

    /// In-memory sink for a scoped `tracing` subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_request_is_logged_before_routing() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        // no index, so routing logs an error after the request line
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_for(dir.path());
        let response = send(&pipeline, Method::GET, "/about?x=1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let output = logs.contents();
        let request_line = output
            .find("203.0.113.7:51234 GET /about?x=1")
            .unwrap_or_else(|| panic!("request line missing from:\n{output}"));
        let routing_line = output.find("Index document").unwrap();
        assert!(request_line < routing_line, "{output}");
        assert_eq!(output.matches("GET /about?x=1").count(), 1, "{output}");
    }
}
