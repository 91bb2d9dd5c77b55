use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed input document: wrong top-level shape, missing CSV headers,
    /// too few lines or an unsupported extension.
    #[error("{0}")]
    Format(String),

    #[error("{}", .0.join(". "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Storage(String),

    /// A background data source could not be read. Logged, never shown.
    #[error("{origin} unavailable: {reason}")]
    SourceUnavailable { origin: String, reason: String },
}

impl Error {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
