//! Learnbase Campus Library
//!
//! Storefront server components: resolves every request's host to a campus
//! (tenant) once, then hands the result to handlers through request
//! extensions.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod routing;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::{CampusError, CampusResult};
pub use routing::{DevOverride, DomainCache, HostResolver, RemoteResolver};
pub use state::AppState;
