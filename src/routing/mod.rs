//! Routing module
//!
//! Maps request paths onto the immutable route table built at startup.

mod table;

pub use table::{Route, RoutePattern, RouteTable, RouteTarget};
