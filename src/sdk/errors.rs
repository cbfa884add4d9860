use thiserror::Error;

/// A central error enum for everything a search SDK backend can report.
///
/// The connection layer never swallows these; they reach the caller either
/// wrapped in [`crate::Error::Open`] (while opening a project) or as
/// [`crate::Error::Sdk`].
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("INI error on line {line}: {message}")]
    Ini { line: usize, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl SdkError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SdkError::InvalidArgument(msg.into())
    }
}
