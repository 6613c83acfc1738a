//! Update dispatch and the long-polling loop

pub mod handler;
pub mod polling;

// Re-export the main entry points for convenience
pub use handler::handle_update;
pub use polling::Poller;
