//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: access logging, body limits,
//! and dispatch to the pages, the content API and the public directory.

use crate::api;
use crate::config::AppState;
use crate::content::ContentDocument;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::render;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, IF_NONE_MATCH};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::for_request(peer, req.method(), req.uri(), req.version());
    entry.referer = header_string(req.headers(), "referer");
    entry.user_agent = header_string(req.headers(), "user-agent");

    logger::log_headers_count(req.headers().len(), state.config.logging.show_headers);

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(hyper::header::SERVER, server);
    }

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let path = parts.uri.path();

    // 1. Content API: the only routes that read a body
    if path.starts_with(api::PREFIX) {
        let max_body_size = state.config.http.max_body_size;
        if let Some(resp) = check_body_size(&parts.headers, max_body_size) {
            return resp;
        }
        let body = match collect_body(body, max_body_size).await {
            Ok(body) => body,
            Err(resp) => return resp,
        };
        let content_type = parts.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        return api::handle_api(&parts.method, path, content_type, body, state).await;
    }

    // 2. Everything else is read-only
    let is_head = parts.method == Method::HEAD;
    if parts.method != Method::GET && !is_head {
        logger::log_warning(&format!("Method not allowed: {} {path}", parts.method));
        return http::build_405_response("GET, HEAD");
    }

    match path {
        "/" => serve_page(state, is_head, render::render_public_page).await,
        "/admin" => {
            let allowed = &state.config.content.allowed_extensions;
            serve_page(state, is_head, |doc| render::render_admin_page(doc, allowed)).await
        }
        _ => {
            let if_none_match = parts.headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok());
            static_files::serve_public(&state.config.content.public_dir, path, if_none_match, is_head)
                .await
        }
    }
}

/// Render a page from the current content document
async fn serve_page<F>(state: &AppState, is_head: bool, render: F) -> Response<Full<Bytes>>
where
    F: FnOnce(&ContentDocument) -> String,
{
    match state.store.read().await {
        Ok(document) => http::build_html_response(render(&document), is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to load content: {e}"));
            http::build_500_response()
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Read the whole body, enforcing the limit on chunked bodies too
async fn collect_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body exceeded {max_body_size} bytes while streaming"
            ));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response())
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
