pub mod client;
pub mod document;
pub mod errors;
pub mod ini;
#[cfg(feature = "memory")]
pub mod memory;

// Re-export the modules here for easy import elsewhere.
pub use client::*;
pub use document::*;
pub use errors::*;
