//! HTTP API and request admission for the agency site.

pub mod extractors;
pub mod middleware;
pub mod pipeline;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
