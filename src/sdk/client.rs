use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use super::document::Document;
use super::errors::SdkError;
use crate::config::ConfigMap;

/// Result of a dynamically dispatched operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The callee returned itself so calls can be chained.
    This,
    Value(Value),
}

impl Reply {
    pub fn value(v: impl Into<Value>) -> Self {
        Reply::Value(v.into())
    }
}

/// A named, capability-checked operation set.
///
/// Every native object exposes the names it implements through `operations`;
/// callers check `supports` before `invoke`, so an object only ever receives
/// operations it declared.
pub trait Dispatch {
    fn operations(&self) -> &[&'static str];

    fn invoke(&self, operation: &str, args: &[Value]) -> Result<Reply, SdkError>;

    fn supports(&self, operation: &str) -> bool {
        self.operations().contains(&operation)
    }
}

/// Entry point of a search SDK: opens clients and hands out tokenizers.
pub trait SearchDriver: Send + Sync {
    /// SDK package version, `None` when the SDK does not expose one.
    fn version(&self) -> Option<&str>;

    /// Open a client bound to one project INI file.
    fn open(&self, ini_file: &Path) -> Result<Box<dyn SearchClient>, SdkError>;

    /// A fresh instance of the SDK's default tokenizer.
    fn tokenizer(&self) -> Arc<dyn Tokenizer>;
}

/// One opened project. Owns the index and search sub-objects.
pub trait SearchClient: Dispatch + Send + Sync {
    /// Merge `configs` into the loaded INI settings. With `overwrite` unset only
    /// keys that are absent from the file are added.
    fn set_configs(&mut self, configs: &ConfigMap, overwrite: bool) -> Result<(), SdkError>;

    fn set_default_charset(&mut self, charset: &str) -> Result<(), SdkError>;

    fn index(&self) -> Arc<dyn IndexWriter>;

    fn search(&self) -> Arc<dyn Searcher>;

    /// Release connections held by the client.
    fn close(&self) -> Result<(), SdkError> {
        Ok(())
    }
}

pub trait IndexWriter: Dispatch + Send + Sync {
    /// Add or replace `doc`. With `add` set the document is inserted without
    /// checking for an existing primary key.
    fn update(&self, doc: &Document, add: bool) -> Result<(), SdkError>;
}

pub trait Searcher: Dispatch + Send + Sync {
    fn set_query(&self, query: &str) -> Result<(), SdkError>;

    /// Run `query`, or the one set by `set_query` when `None`.
    fn search(&self, query: Option<&str>) -> Result<Vec<Document>, SdkError>;

    fn count(&self, query: Option<&str>) -> Result<u64, SdkError>;
}

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}
