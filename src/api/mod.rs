// API module entry
// Content editing endpoints: form update and image upload

mod response;
mod update;
mod upload;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::config::AppState;
use crate::http;
use crate::logger;

/// Path prefix owned by this module
pub const PREFIX: &str = "/api/";

/// API route handler
///
/// Dispatches on path first so a wrong method on a known endpoint gets 405
/// rather than 404. The body has already been collected by the router.
pub async fn handle_api(
    method: &Method,
    path: &str,
    content_type: Option<&str>,
    body: Bytes,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match path {
        update::PATH | upload::PATH if *method != Method::POST => {
            logger::log_api_request(method.as_str(), path, 405);
            http::build_405_response("POST")
        }
        update::PATH => update::handle_update(content_type, body, state).await,
        upload::PATH => upload::handle_upload(content_type, body, state).await,
        _ => {
            logger::log_api_request(method.as_str(), path, 404);
            response::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let dir = TempDir::new().unwrap();
        let state = AppState::rooted_at(dir.path());

        let resp = handle_api(&Method::GET, "/api/update", None, Bytes::new(), &state).await;

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], "POST");
        assert!(!state.store.path().exists());
    }

    #[tokio::test]
    async fn test_unknown_endpoint_is_404() {
        let dir = TempDir::new().unwrap();
        let state = AppState::rooted_at(dir.path());

        let resp = handle_api(&Method::POST, "/api/nope", None, Bytes::new(), &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_dispatch() {
        let dir = TempDir::new().unwrap();
        let state = AppState::rooted_at(dir.path());

        let resp = handle_api(
            &Method::POST,
            "/api/update",
            Some("application/x-www-form-urlencoded"),
            Bytes::from_static(b"footer=hi"),
            &state,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    }
}
