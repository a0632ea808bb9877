//! Request middleware

mod tenant;

pub use tenant::{inbound_host, require_campus, resolve_tenant, CurrentTenant, RequestHost};
