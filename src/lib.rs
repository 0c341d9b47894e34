//! Front-end host: serves `index.html`, mounted asset directories and a JSON
//! health endpoint over HTTP/1.1.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
