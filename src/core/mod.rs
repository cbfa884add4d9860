pub mod cache;
pub mod connection_manager;
pub mod errors;
pub mod events;
pub mod project;

// Re-export the modules here for easy import elsewhere.
pub use cache::*;
pub use connection_manager::*;
pub use errors::*;
pub use events::*;
pub use project::*;
