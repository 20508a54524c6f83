//! HTTP protocol layer module
//!
//! Caching, MIME detection and response builders shared by the page,
//! static file and API handlers.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_400_response, build_404_response, build_405_response,
    build_413_response, build_500_response, build_cached_response, build_html_response,
    build_see_other_response,
};
