pub mod session_limit;

// Re-export middleware functions
pub use session_limit::session_limit_middleware;
