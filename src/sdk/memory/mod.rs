//! In-process search backend.
//!
//! Reads the project INI file the same way a daemon-backed SDK does, keeps
//! documents in memory keyed by the project's primary-key field and answers
//! plain term queries. Useful for embedding, demos and tests; it does not rank.

mod client;
mod index;
mod search;
mod tokenizer;

use std::path::Path;
use std::sync::Arc;

use log::info;
use serde_json::Value;

use super::client::{SearchClient, SearchDriver, Tokenizer};
use super::errors::SdkError;
use super::ini::IniDocument;

pub use client::MemoryClient;
pub use index::MemoryIndex;
pub use search::MemorySearch;
pub use tokenizer::SimpleTokenizer;

/// Version reported by the memory driver.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Default)]
pub struct MemoryDriver;

impl MemoryDriver {
    pub fn new() -> Self {
        Self
    }
}

impl SearchDriver for MemoryDriver {
    fn version(&self) -> Option<&str> {
        Some(PACKAGE_VERSION)
    }

    fn open(&self, ini_file: &Path) -> Result<Box<dyn SearchClient>, SdkError> {
        let ini = IniDocument::load(ini_file)?;
        let client = MemoryClient::new(ini, Arc::new(SimpleTokenizer))?;
        info!(
            "Opened in-memory project '{}' from {:?}",
            client.name(),
            ini_file
        );
        Ok(Box::new(client))
    }

    fn tokenizer(&self) -> Arc<dyn Tokenizer> {
        Arc::new(SimpleTokenizer)
    }
}

fn arg_str<'a>(args: &'a [Value], idx: usize, op: &str) -> Result<&'a str, SdkError> {
    args.get(idx)
        .and_then(Value::as_str)
        .ok_or_else(|| SdkError::invalid_argument(format!("{op}: argument {idx} must be a string")))
}

fn arg_usize(args: &[Value], idx: usize, op: &str) -> Result<Option<usize>, SdkError> {
    match args.get(idx) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                SdkError::invalid_argument(format!(
                    "{op}: argument {idx} must be a non-negative integer that fits in usize"
                ))
            }),
    }
}
