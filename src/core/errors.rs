use std::path::PathBuf;

use thiserror::Error;

use crate::sdk::errors::SdkError;

/// A central error enum for the connection layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed overrides, bad aliases, or an SDK without a version.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The SDK client could not be constructed for a project INI file.
    #[error("Cannot open {}: {source}", .ini_file.display())]
    Open {
        ini_file: PathBuf,
        source: SdkError,
    },

    /// A forwarded operation is implemented by neither the client, the index
    /// writer nor the searcher.
    #[error("Calling unknown method: {type_name}::{operation}()")]
    MethodNotFound {
        type_name: &'static str,
        operation: String,
    },

    #[error("Project '{0}' has been closed")]
    Closed(String),

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

pub type Result<T> = std::result::Result<T, Error>;
