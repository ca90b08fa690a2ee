//! API layer - HTTP handlers and routing
//!
//! Translates HTTP requests into user store calls and store results
//! into HTTP responses. Holds no state beyond the store handle.

pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
