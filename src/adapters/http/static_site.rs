//! Static file router with a directory-listing fallback.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use http::{StatusCode, Uri};
use percent_encoding::percent_decode_str;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::listing::{
    escape_html, list_directory, render_listing, render_not_found, render_page, ListingOptions,
};

/// Ports and targets shown in the root page status box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeStatus {
    pub http_port: u16,
    pub ws_port: u16,
    pub osc_target: String,
    pub osc_local_port: u16,
}

impl BridgeStatus {
    fn render(&self) -> String {
        format!(
            r#"<div class="card padding status">
  <h2>Microtonal WebSocket-OSC Server</h2>
  <p>HTTP: port {}</p>
  <p>WebSocket: port {}</p>
  <p>OSC target: {}</p>
  <p>OSC local port: {}</p>
</div>"#,
            self.http_port,
            self.ws_port,
            escape_html(&self.osc_target),
            self.osc_local_port
        )
    }
}

/// Shared state for the listing handler.
#[derive(Clone)]
pub struct StaticSiteState {
    root: Arc<PathBuf>,
    status: Arc<BridgeStatus>,
}

impl StaticSiteState {
    pub fn new(root: impl Into<PathBuf>, status: BridgeStatus) -> Self {
        Self {
            root: Arc::new(root.into()),
            status: Arc::new(status),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Build the HTTP router: files first, listing or 404 otherwise.
pub fn static_router(state: StaticSiteState) -> Router {
    let fallback = get(listing_handler).with_state(state.clone());
    let files = ServeDir::new(state.root()).fallback(fallback);

    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

async fn listing_handler(State(state): State<StaticSiteState>, uri: Uri) -> Response {
    let url_path = percent_decode(uri.path());

    let Some(relative) = safe_relative(&url_path) else {
        tracing::debug!(path = %url_path, "Rejected listing path");
        return not_found(&uri);
    };

    let target = state.root().join(&relative);
    let is_dir = tokio::fs::metadata(&target)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return not_found(&uri);
    }

    let entries = match list_directory(state.root(), &target, ListingOptions::default()).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!(path = %target.display(), error = %e, "Failed to read directory");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page("<p>Unable to read directory.</p>")),
            )
                .into_response();
        }
    };

    let mut body = String::new();
    if relative.as_os_str().is_empty() {
        body.push_str(&state.status.render());
    }
    body.push_str(&render_listing(&url_path, &entries));

    Html(render_page(&body)).into_response()
}

fn not_found(uri: &Uri) -> Response {
    (StatusCode::NOT_FOUND, Html(render_page(&render_not_found(&uri.to_string())))).into_response()
}

/// Turn a URL path into a root-relative filesystem path.
///
/// Returns `None` for any path with a `..` or prefix component.
fn safe_relative(url_path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(url_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn percent_decode(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use http::Request;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("31-TET").join("assets")).unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::create_dir(dir.path().join("with space")).unwrap();
        fs::write(dir.path().join("31-TET").join("notes.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("19-TET")).unwrap();
        fs::write(dir.path().join("19-TET").join("index.html"), "<p>keys</p>").unwrap();

        let status = BridgeStatus {
            http_port: 8001,
            ws_port: 8080,
            osc_target: "127.0.0.1:57120".into(),
            osc_local_port: 57121,
        };
        let router = static_router(StaticSiteState::new(dir.path(), status));
        (dir, router)
    }

    async fn get_page(router: Router, path: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_shows_status_and_project_directories() {
        let (_dir, router) = site();

        let (status, body) = get_page(router, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("WebSocket: port 8080"));
        assert!(body.contains("OSC target: 127.0.0.1:57120"));
        assert!(body.contains(">31-TET<"));
        assert!(!body.contains("node_modules"));
        assert!(!body.contains(">..<"));
    }

    #[tokio::test]
    async fn nested_directory_lists_parent_without_status() {
        let (_dir, router) = site();

        let (status, body) = get_page(router, "/31-TET/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(">..<"));
        assert!(body.contains(">assets<"));
        assert!(!body.contains("notes.txt"));
        assert!(!body.contains("WebSocket: port"));
    }

    #[tokio::test]
    async fn files_are_served_directly() {
        let (_dir, router) = site();

        let (status, body) = get_page(router, "/31-TET/notes.txt").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn directory_index_is_served() {
        let (_dir, router) = site();

        let (status, body) = get_page(router, "/19-TET/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<p>keys</p>");
    }

    #[tokio::test]
    async fn missing_path_is_404_page() {
        let (_dir, router) = site();

        let (status, body) = get_page(router, "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<b>/nope</b> does not exist"));
    }

    #[tokio::test]
    async fn encoded_names_resolve() {
        let (_dir, router) = site();

        let (status, _) = get_page(router, "/with%20space/").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn parent_components_are_rejected() {
        assert!(safe_relative("/../etc").is_none());
        assert!(safe_relative("/a/../../b").is_none());
        assert_eq!(safe_relative("/a/./b/"), Some(PathBuf::from("a/b")));
        assert_eq!(safe_relative("/"), Some(PathBuf::new()));
    }

    #[test]
    fn percent_decode_handles_escapes_and_garbage() {
        assert_eq!(percent_decode("/a%20b"), "/a b");
        assert_eq!(percent_decode("/scales%20"), "/scales ");
        assert_eq!(percent_decode("/%C3%A9t%C3%A9"), "/\u{e9}t\u{e9}");
        assert_eq!(percent_decode("/%2e%2e/"), "/../");
        assert_eq!(percent_decode("/100%"), "/100%");
        assert_eq!(percent_decode("/%zz"), "/%zz");
    }
}
