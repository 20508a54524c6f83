// Image upload handler

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::{json_error, json_response};
use crate::config::AppState;
use crate::logger;
use crate::upload::{read_file_field, IMAGE_FIELD};

pub const PATH: &str = "/api/upload";

/// Save the `image` part of a multipart body and answer with its public path
pub async fn handle_upload(
    content_type: Option<&str>,
    body: Bytes,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let file = match read_file_field(content_type, body, IMAGE_FIELD).await {
        Ok(file) => file,
        Err(e) => {
            logger::log_api_request("POST", PATH, 400);
            return json_error(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    match state.uploads.save(&file).await {
        Ok(stored) => {
            logger::log_upload_saved(&stored.file_path, file.data.len());
            logger::log_api_request("POST", PATH, 200);
            json_response(StatusCode::OK, &stored)
        }
        Err(e) if e.is_client_error() => {
            logger::log_debug(&format!("Upload of '{}' rejected: {e}", file.file_name));
            logger::log_api_request("POST", PATH, 400);
            json_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            logger::log_error(&format!("Upload failed: {e}"));
            logger::log_api_request("POST", PATH, 500);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}
