//! Content module
//!
//! The persisted content document, the form-to-document merge, and the
//! file store that holds it.

mod document;
mod error;
mod form;
mod store;

pub use document::{ContentDocument, ContentValue};
pub use form::{build_update, decode_form, FormSubmission};
pub use store::ContentStore;
