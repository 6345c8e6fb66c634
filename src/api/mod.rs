//! HTTP API for the wagering engine
//!
//! JSON over axum. Caller identity arrives in the `x-user-id` header.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{build_app, build_state, ApiServer};
