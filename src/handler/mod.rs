//! Request handler module
//!
//! Routes each request to the public page, the admin page, the content
//! API, or the public directory.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
