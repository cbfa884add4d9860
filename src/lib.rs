//! Lazily opened, cached search project handles on top of a pluggable search
//! engine SDK.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_bridge::{ConnectionConfig, ConnectionManager};
//! use search_bridge::sdk::memory::MemoryDriver;
//!
//! # fn main() -> search_bridge::Result<()> {
//! let manager = ConnectionManager::new(
//!     ConnectionConfig::new("/etc/search"),
//!     Arc::new(MemoryDriver::new()),
//! )?;
//! let demo = manager.project("demo")?;
//! demo.add([("pid", "1"), ("subject", "hello search")])?;
//! let hits = demo.searcher()?.search(Some("hello"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod sdk;
#[cfg(feature = "memory")]
pub mod ui;
pub mod utils;

// re‑export ergonomic entry points
pub use config::{ConfigMap, ConnectionConfig};
pub use crate::core::connection_manager::ConnectionManager;
pub use crate::core::errors::{Error, Result};
pub use crate::core::events::{OpenEvent, EVENT_BEFORE_OPEN};
pub use crate::core::project::{Forwarded, PersistedHandleState, ProjectHandle, ProjectOptions};
pub use sdk::document::{Document, DocumentData, Fields};
