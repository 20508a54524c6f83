// Content update handler
// Applies a urlencoded or multipart form submission to the content document

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::response::json_error;
use crate::config::AppState;
use crate::content::{build_update, decode_form, FormSubmission};
use crate::http;
use crate::logger;
use crate::upload::read_text_fields;

pub const PATH: &str = "/api/update";

/// Where the browser lands after saving
const ADMIN_PATH: &str = "/admin";

const MULTIPART_FORM: &str = "multipart/form-data";

/// Merge the submitted fields into the stored document and redirect to the
/// admin page. A malformed field name rejects the whole submission.
pub async fn handle_update(
    content_type: Option<&str>,
    body: Bytes,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let submission = match read_submission(content_type, body).await {
        Ok(submission) => submission,
        Err(message) => {
            logger::log_warning(&format!("Unreadable content update: {message}"));
            logger::log_api_request("POST", PATH, 400);
            return json_error(StatusCode::BAD_REQUEST, &message);
        }
    };
    let field_count = submission.len();
    logger::log_debug(&format!("{PATH}: {field_count} field(s) submitted"));

    let update = match build_update(submission) {
        Ok(update) => update,
        Err(e) => {
            logger::log_warning(&format!("Rejected content update: {e}"));
            logger::log_api_request("POST", PATH, 400);
            return json_error(StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    match state.store.apply(update).await {
        Ok(document) => {
            logger::log_content_updated(state.store.path(), field_count, document.len());
            logger::log_api_request("POST", PATH, 303);
            http::build_see_other_response(ADMIN_PATH)
        }
        Err(e) => {
            logger::log_error(&format!("Content update failed: {e}"));
            logger::log_api_request("POST", PATH, 500);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Decode the body by its content type; anything not multipart is read as urlencoded
async fn read_submission(
    content_type: Option<&str>,
    body: Bytes,
) -> Result<FormSubmission, String> {
    match content_type {
        Some(ct) if is_multipart(ct) => read_text_fields(ct, body)
            .await
            .map_err(|e| e.to_string()),
        _ => Ok(decode_form(&body)),
    }
}

fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(MULTIPART_FORM))
}
