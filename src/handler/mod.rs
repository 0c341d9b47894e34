//! Request handler module
//!
//! Responsible for request routing dispatch and the three route handlers:
//! mounted static files, the index page and the health check.

pub mod health;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
