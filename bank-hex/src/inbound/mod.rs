//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the balance service.

mod handlers;
mod role;
mod server;

pub use role::{ROLE_HEADER, extract_role};
pub use server::HttpServer;
