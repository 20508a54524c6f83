// Multipart body extraction

use futures::stream;
use hyper::body::Bytes;
use std::convert::Infallible;

use super::UploadError;
use crate::content::FormSubmission;

/// A file part pulled out of a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// Find the file part named `field_name` in an already collected body.
///
/// A matching part without a `filename` comes back with an empty name. A
/// body that is not multipart, or has no such part, yields
/// [`UploadError::MissingFile`].
pub async fn read_file_field(
    content_type: Option<&str>,
    body: Bytes,
    field_name: &str,
) -> Result<UploadedFile, UploadError> {
    let Some(boundary) = content_type.and_then(|ct| multer::parse_boundary(ct).ok()) else {
        return Err(UploadError::MissingFile);
    };

    let body_stream = stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(body_stream, boundary);

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        return Ok(UploadedFile { file_name, data });
    }

    Err(UploadError::MissingFile)
}

/// Collect the plain text parts of a multipart body as form fields.
///
/// Parts carrying a `filename` are skipped. As with urlencoded forms the
/// first value of a repeated name wins.
pub async fn read_text_fields(
    content_type: &str,
    body: Bytes,
) -> Result<FormSubmission, UploadError> {
    let boundary = multer::parse_boundary(content_type)?;
    let body_stream = stream::once(async move { Ok::<_, Infallible>(body) });
    let mut multipart = multer::Multipart::new(body_stream, boundary);

    let mut fields = FormSubmission::new();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };
        let value = field.text().await?;
        fields.entry(name).or_insert(value);
    }
    Ok(fields)
}
