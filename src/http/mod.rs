//! HTTP protocol layer module
//!
//! Content types, cache validators and response builders, independent of routing.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::Validators;
pub use response::{
    build_304_response, build_403_response, build_404_response, build_405_response,
    build_500_response, build_file_response, build_json_response,
    build_route_not_found_response,
};
