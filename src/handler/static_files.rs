//! Static file serving module
//!
//! Serves the public directory (stylesheets, scripts and uploaded images)
//! with MIME detection and `ETag` revalidation.

use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::Path;
use tokio::fs;

const INDEX_FILE: &str = "index.html";

/// Serve `path` from the public directory, 404 when it does not resolve to a file inside it
pub async fn serve_public(
    public_dir: &Path,
    path: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    match load_from_directory(public_dir, path).await {
        Some((content, content_type)) => {
            build_static_file_response(content, content_type, if_none_match, is_head)
        }
        None => http::build_404_response(),
    }
}

/// Load a file from the directory, falling back to `index.html` for directories
pub async fn load_from_directory(
    static_dir: &Path,
    path: &str,
) -> Option<(Vec<u8>, &'static str)> {
    // Remove leading slash; `..` is only refused as a whole path segment
    let relative_path = path.trim_start_matches('/');
    if relative_path.split(['/', '\\']).any(|segment| segment == "..") {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return None;
    }

    let mut file_path = static_dir.join(relative_path);

    // Security: ensure file_path is within static_dir
    let static_dir_canonical = match static_dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_debug(&format!(
                "Public directory not found or inaccessible '{}': {e}",
                static_dir.display()
            ));
            return None;
        }
    };

    if file_path.is_dir() {
        file_path = file_path.join(INDEX_FILE);
    }

    // File not found is common (404), no need to log at warning level
    let Ok(file_path_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_path_canonical.display()
        ));
        return None;
    }
    if !file_path_canonical.is_file() {
        return None;
    }

    let content = match fs::read(&file_path_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            return None;
        }
    };

    // Determine content type from extension
    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}

/// Build static file response with `ETag` support
fn build_static_file_response(
    data: Vec<u8>,
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(&data);

    // Check if client has cached version
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    http::build_cached_response(Bytes::from(data), content_type, &etag, is_head)
}
