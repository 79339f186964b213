pub mod assistant;
pub mod auth;
pub mod favorites;
pub mod middleware;
pub mod notes;
pub mod resource;
pub mod rest;
pub mod scripture;
pub mod state;

// Re-export what the binaries need to assemble the server.
pub use middleware::require_auth;
pub use rest::{build_router, ApiDoc};
pub use state::AppState;
