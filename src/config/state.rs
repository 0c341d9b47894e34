// Application state module
// Immutable state shared by every connection

use super::types::Config;
use crate::error::RouteTableError;
use crate::routing::RouteTable;

/// Application state, built once at startup and never mutated
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    /// Build the state, validating the site layout described by `config`
    pub fn new(config: Config) -> Result<Self, RouteTableError> {
        let routes = RouteTable::from_site(&config.site)?;
        Ok(Self { config, routes })
    }
}
