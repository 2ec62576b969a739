//! HTTP API layer for renthub.
//!
//! REST endpoints over the core services:
//!
//! - **Endpoints**: one module per aggregate (houses, viewings, favorites,
//!   users, landlords)
//! - **Extractors**: authenticated-user extraction from request extensions
//! - **Middleware**: bearer-token authentication
//! - **Response**: uniform JSON envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
