pub mod settings;

use indexmap::IndexMap;

/// Flat, ordered key → value configuration as understood by search SDK clients.
pub type ConfigMap = IndexMap<String, String>;

pub use settings::{ConnectionConfig, DEFAULT_CHARSET, DEFAULT_INI_DIRECTORY, WILDCARD};
