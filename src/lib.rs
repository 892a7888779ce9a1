pub mod config;
pub mod core;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use crate::core::*;
pub use routes::create_app;
pub use state::AppState;
