//! Learnbase API Library
//!
//! Backend REST API components. The campus storefront calls
//! `GET /campus/resolve` here to map custom domains to tenants.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
